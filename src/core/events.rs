//! Core Events
//!
//! This module defines events used for communication between different components
//! of the respiration tracker. Events are central to the application's event-driven architecture.
use crate::model::session::RateMeasurement;

/// Enumeration of events controlling the recording lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingEvent {
    /// Start the acquisition scheduler.
    #[allow(dead_code)]
    StartRecording,
    /// Stop the acquisition scheduler and finish the session.
    StopRecording,
}

/// Enumeration of all application-level events.
///
/// These events drive the interaction between the control surface, the
/// scheduler worker, and the views.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    /// Recording lifecycle events.
    Recording(RecordingEvent),

    /// A human-readable progress or advisory message.
    Status(String),

    /// A completed rate measurement.
    Measurement(RateMeasurement),
}
