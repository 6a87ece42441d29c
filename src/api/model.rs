//! This module defines the read only API for interacting with the models.
//! It provides interfaces for accessing the measurements recorded during a
//! tracking run.
use std::{fmt::Debug, sync::Arc};
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use crate::model::session::RateMeasurement;

/// `MeasurementModelApi` trait.
///
/// Defines the read-only interface to a session's recorded measurements.
pub trait MeasurementModelApi: Debug + Send + Sync {
    /// Retrieves the start time of the session.
    ///
    /// # Returns
    /// An `OffsetDateTime` indicating the start time.
    #[allow(dead_code)]
    fn get_start_time(&self) -> &OffsetDateTime;

    /// Retrieves the measurements recorded so far, in acquisition order.
    fn get_measurements(&self) -> &[RateMeasurement];

    /// Retrieves the most recent measurement.
    ///
    /// # Returns
    /// An optional `RateMeasurement` representing the last completed cycle.
    fn get_last_measurement(&self) -> Option<&RateMeasurement>;

    /// Retrieves the elapsed time since the start of the session.
    ///
    /// # Returns
    /// A `Duration` representing the elapsed time.
    fn get_elapsed_time(&self) -> Duration;
}

pub type ModelHandle<T> = Arc<RwLock<T>>;
