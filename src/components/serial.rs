//! Serial Sensor Module
//!
//! This module implements the serial link to the respiration sensor. It
//! handles device discovery by description marker, the open/settle/handshake
//! sequence, and blocking line-oriented reads for the acquisition loop.
use crate::api::controller::SensorLink;
use crate::core::constants::{
    PORT_POLL_TIMEOUT, PORT_SETTLE_DELAY, SENSOR_BAUD_RATE, START_STREAMING_COMMAND,
};
use crate::core::events::AppEvent;
use crate::model::serial::select_port;
use crate::model::session::SessionConfig;
use anyhow::{Context, Result};
use log::{trace, warn};
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read, Write};
use std::thread;
use tokio::sync::broadcast::Sender;

#[cfg(feature = "mock")]
use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "mock")]
use std::time::Duration;

/// Serial connection to the respiration sensor.
///
/// Owns the OS port handle for the lifetime of a recording. The link is
/// established on the control surface via [`SensorLink::attach`] and then
/// moved into the scheduler worker.
pub struct SerialSensor {
    port: Box<dyn SerialPort>,
}

impl SensorLink for SerialSensor {
    fn attach(config: &SessionConfig, events: &Sender<AppEvent>) -> Result<Self> {
        let ports = serialport::available_ports().context("serial port enumeration failed")?;
        let selection = match select_port(&ports, &config.device_marker) {
            Ok(selection) => selection,
            Err(e) => {
                let _ = events.send(AppEvent::Status(format!(
                    "No {} devices found, please connect one and retry.",
                    config.device_marker
                )));
                return Err(e.into());
            }
        };
        if selection.other_matches > 0 {
            warn!(
                "{} ports match {:?}, continuing with {}",
                selection.other_matches + 1,
                config.device_marker,
                selection.port_name
            );
            let _ = events.send(AppEvent::Status(format!(
                "Multiple {} devices found - using the first.",
                config.device_marker
            )));
        } else {
            let _ = events.send(AppEvent::Status(format!(
                "{} found at port {}.",
                config.device_marker, selection.port_name
            )));
        }
        let port = serialport::new(selection.port_name.as_str(), SENSOR_BAUD_RATE)
            .timeout(PORT_POLL_TIMEOUT)
            .open()
            .with_context(|| format!("could not open {}", selection.port_name))?;
        let mut sensor = Self { port };
        // Opening the port resets the sensor; it must come back up before it
        // can accept the handshake.
        thread::sleep(PORT_SETTLE_DELAY);
        sensor
            .port
            .write_all(&[START_STREAMING_COMMAND])
            .context("start-streaming handshake failed")?;
        trace!("sensor streaming on {}", selection.port_name);
        Ok(sensor)
    }

    fn clear_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn read_record(&mut self) -> Result<String> {
        let mut record = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => continue,
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => record.push(byte[0]),
                // The poll timeout only bounds a single read call; keep
                // waiting for the rest of the line.
                Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(String::from_utf8_lossy(&record).into_owned())
    }
}

/// Simulated sensor for exercising the pipeline without hardware.
///
/// Emits a roughly periodic breathing waveform: bursts of positive samples
/// separated by zero-valued baseline stretches, with jitter on the phase
/// lengths.
#[cfg(feature = "mock")]
pub struct MockSensor {
    rng: StdRng,
    remaining_in_phase: u32,
    inhaling: bool,
}

#[cfg(feature = "mock")]
impl SensorLink for MockSensor {
    fn attach(_config: &SessionConfig, events: &Sender<AppEvent>) -> Result<Self> {
        let _ = events.send(AppEvent::Status("Simulated sensor attached.".to_string()));
        Ok(Self {
            rng: StdRng::from_entropy(),
            remaining_in_phase: 0,
            inhaling: true,
        })
    }

    fn clear_input(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_record(&mut self) -> Result<String> {
        // About 20 samples per second with phases between one and two
        // seconds, mimicking a resting respiration waveform.
        thread::sleep(Duration::from_millis(50));
        if self.remaining_in_phase == 0 {
            self.inhaling = !self.inhaling;
            self.remaining_in_phase = self.rng.gen_range(20..40);
        }
        self.remaining_in_phase -= 1;
        let value = if self.inhaling {
            self.rng.gen_range(1..=9)
        } else {
            0
        };
        Ok(value.to_string())
    }
}
