//! Serial Device Model
//!
//! This module defines the serial-domain model and utility structures.
//! It provides abstractions for:
//! - Device selection among enumerated serial ports
//! - Decoding raw sensor records into sample values
//! - Device lookup errors

use serialport::{SerialPortInfo, SerialPortType};
use thiserror::Error;

/// Errors raised while locating the sensor device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No connected device description matched the configured marker.
    #[error("no {marker:?} devices found")]
    NoDeviceFound { marker: String },
}

/// Outcome of the device selection policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSelection {
    /// OS name of the selected port.
    pub port_name: String,
    /// Number of additional ports that also matched the marker.
    pub other_matches: usize,
}

/// Extracts the descriptive product string of a port, if it has one.
fn description(port: &SerialPortInfo) -> Option<&str> {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => usb.product.as_deref(),
        _ => None,
    }
}

/// Selects the sensor port among the enumerated candidates.
///
/// A port matches when its description contains `marker`. The first match in
/// enumeration order wins; additional matches are reported through
/// [`PortSelection::other_matches`] so the caller can raise an advisory.
///
/// # Arguments
/// * `ports` - The enumerated serial ports.
/// * `marker` - Substring to match against the port descriptions.
///
/// # Returns
/// The selected port, or [`DeviceError::NoDeviceFound`] when nothing matches.
pub fn select_port(ports: &[SerialPortInfo], marker: &str) -> Result<PortSelection, DeviceError> {
    let mut matches = ports
        .iter()
        .filter(|port| description(port).is_some_and(|desc| desc.contains(marker)));
    match matches.next() {
        Some(port) => Ok(PortSelection {
            port_name: port.port_name.clone(),
            other_matches: matches.count(),
        }),
        None => Err(DeviceError::NoDeviceFound {
            marker: marker.to_string(),
        }),
    }
}

/// Decodes one record from the sensor into a sample value.
///
/// Only the leading character of the record is parsed. The sensor firmware
/// emits a single digit per line and the established protocol reads exactly
/// that digit, so longer records truncate to their first character and
/// records whose first character is not a digit are dropped.
///
/// # Arguments
/// * `record` - One line from the sensor, without its terminator.
///
/// # Returns
/// The decoded sample value, or `None` when the record does not decode.
pub fn decode_sample(record: &str) -> Option<f64> {
    record.get(0..1).and_then(|leading| leading.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_port(name: &str, product: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x2341,
                pid: 0x0043,
                serial_number: None,
                manufacturer: Some("Arduino LLC".to_string()),
                product: product.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_select_single_match() {
        let ports = vec![
            usb_port("/dev/ttyUSB0", Some("FTDI adapter")),
            usb_port("/dev/ttyACM0", Some("Arduino Uno")),
        ];
        let selection = select_port(&ports, "Arduino").unwrap();
        assert_eq!(selection.port_name, "/dev/ttyACM0");
        assert_eq!(selection.other_matches, 0);
    }

    #[test]
    fn test_select_prefers_first_of_multiple_matches() {
        let ports = vec![
            usb_port("/dev/ttyACM0", Some("Arduino Uno")),
            usb_port("/dev/ttyACM1", Some("Arduino Mega")),
        ];
        let selection = select_port(&ports, "Arduino").unwrap();
        assert_eq!(selection.port_name, "/dev/ttyACM0");
        assert_eq!(selection.other_matches, 1);
    }

    #[test]
    fn test_select_reports_missing_device() {
        let ports = vec![
            usb_port("/dev/ttyUSB0", Some("FTDI adapter")),
            usb_port("/dev/ttyUSB1", None),
            SerialPortInfo {
                port_name: "/dev/ttyS0".to_string(),
                port_type: SerialPortType::Unknown,
            },
        ];
        assert!(matches!(
            select_port(&ports, "Arduino"),
            Err(DeviceError::NoDeviceFound { .. })
        ));
    }

    #[test]
    fn test_decode_reads_only_the_leading_character() {
        assert_eq!(decode_sample("1"), Some(1.0));
        assert_eq!(decode_sample("5\r"), Some(5.0));
        assert_eq!(decode_sample("12"), Some(1.0));
        assert_eq!(decode_sample("2.17"), Some(2.0));
    }

    #[test]
    fn test_decode_drops_non_numeric_records() {
        assert_eq!(decode_sample(""), None);
        assert_eq!(decode_sample("-3"), None);
        assert_eq!(decode_sample("ok"), None);
        assert_eq!(decode_sample("\r"), None);
    }
}
