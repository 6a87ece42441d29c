//! Acquisition Session Module
//!
//! This module runs one observation window against the sensor link. It
//! flushes the link, collects newline-delimited records for the duration of
//! the window, and reduces the decoded samples to a rate measurement.
use crate::api::controller::SensorLink;
use crate::core::constants::OBSERVATION_WINDOW;
use crate::core::events::AppEvent;
use crate::math::respiration::{count_breath_onsets, rate_per_minute};
use crate::model::serial::decode_sample;
use crate::model::session::{RateMeasurement, SampleWindow};
use log::{trace, warn};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::Sender;

/// Runs observation windows and produces rate measurements.
#[derive(Clone, Debug)]
pub struct AcquisitionComponent {
    event_bus: Sender<AppEvent>,
    window_duration: Duration,
}

impl AcquisitionComponent {
    /// Creates a component with the production window length.
    ///
    /// # Arguments
    /// - `event_bus`: The event bus for broadcasting application events.
    pub fn new(event_bus: Sender<AppEvent>) -> Self {
        Self::with_window(event_bus, OBSERVATION_WINDOW)
    }

    /// Creates a component with a custom window length.
    #[allow(dead_code)]
    pub fn with_window(event_bus: Sender<AppEvent>, window_duration: Duration) -> Self {
        Self {
            event_bus,
            window_duration,
        }
    }

    /// Length of the observation window this component runs.
    pub fn window_duration(&self) -> Duration {
        self.window_duration
    }

    /// Runs one observation window and derives the rate.
    ///
    /// Undecodable records and transient read failures are skipped, so the
    /// session always produces a measurement. A sensor that stops emitting
    /// lines blocks inside `read_record` indefinitely.
    pub fn acquire<L: SensorLink>(&self, link: &mut L) -> RateMeasurement {
        let _ = self.event_bus.send(AppEvent::Status(
            "Obtaining respiration data, do not disturb tubing.".to_string(),
        ));
        if let Err(e) = link.clear_input() {
            warn!("could not flush sensor input: {}", e);
        }
        let mut window = SampleWindow::default();
        let window_start = Instant::now();
        while window_start.elapsed() <= self.window_duration {
            // Reset per pass; stale lines must not accumulate between reads.
            if let Err(e) = link.clear_input() {
                trace!("input buffer reset failed: {}", e);
            }
            match link.read_record() {
                Ok(record) => {
                    if let Some(value) = decode_sample(&record) {
                        window.push(window_start.elapsed(), value);
                    } else {
                        trace!("discarding undecodable record {:?}", record);
                    }
                }
                Err(e) => trace!("sensor read failed, continuing: {}", e),
            }
        }
        let onsets = count_breath_onsets(&window.values());
        trace!(
            "window closed with {} samples and {} onsets",
            window.len(),
            onsets
        );
        RateMeasurement::new(rate_per_minute(onsets, self.window_duration))
    }
}
