//! Session Model
//!
//! This module defines the model for one tracking run. It provides structures
//! for the samples collected during an observation window, the derived rate
//! measurements, the persisted session log, and the operator configuration.

use crate::core::constants::{FILE_STAMP_FORMAT, TIMESTAMP_FORMAT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use time::OffsetDateTime;

/// Samples collected over one observation window.
///
/// Insertion order is arrival order. The window only lives for the duration
/// of one acquisition and is reduced to a rate when it closes.
#[derive(Clone, Debug, Default)]
pub struct SampleWindow {
    /// Collected samples with their elapsed time since the window opened.
    samples: Vec<(Duration, f64)>,
}

impl SampleWindow {
    /// Appends a decoded sample.
    pub fn push(&mut self, elapsed: Duration, value: f64) {
        self.samples.push((elapsed, value));
    }

    /// Sample values in arrival order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|(_, value)| *value).collect()
    }

    /// Number of collected samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One derived respiration rate with the wall-clock time it was taken.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateMeasurement {
    /// Completion time of the observation window.
    pub timestamp: OffsetDateTime,
    /// Whole breaths per minute derived from the window.
    pub breaths_per_minute: u32,
}

impl RateMeasurement {
    /// Constructs a measurement taken now.
    pub fn new(breaths_per_minute: u32) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            breaths_per_minute,
        }
    }

    /// The measurement timestamp formatted for display.
    pub fn formatted_time(&self) -> String {
        self.timestamp
            .format(TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| String::from("--:--:--"))
    }
}

/// Persisted record of one tracking run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionData {
    /// The start time of the run.
    start_time: OffsetDateTime,
    /// Completed measurements in acquisition order.
    measurements: Vec<RateMeasurement>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            start_time: OffsetDateTime::now_utc(),
            measurements: Vec::new(),
        }
    }
}

impl SessionData {
    /// Appends a completed measurement.
    pub fn add_measurement(&mut self, measurement: RateMeasurement) {
        self.measurements.push(measurement);
    }

    /// The start time of the run.
    pub fn start_time(&self) -> &OffsetDateTime {
        &self.start_time
    }

    /// Completed measurements in acquisition order.
    pub fn measurements(&self) -> &[RateMeasurement] {
        &self.measurements
    }
}

/// Operator-provided settings for one tracking run.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Repeat interval between acquisition cycles, in whole minutes.
    pub interval_minutes: u64,
    /// Substring matched against device descriptions when locating the sensor.
    pub device_marker: String,
    /// Destination of the measurement log.
    pub output: PathBuf,
}

impl SessionConfig {
    /// The repeat interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    /// Builds the timestamped default output path, e.g.
    /// `2025_01_31-14_07_respiration_data.json`.
    pub fn default_output_path() -> PathBuf {
        let stamp = OffsetDateTime::now_utc()
            .format(FILE_STAMP_FORMAT)
            .unwrap_or_else(|_| String::from("session"));
        PathBuf::from(format!("{}_respiration_data.json", stamp))
    }
}
