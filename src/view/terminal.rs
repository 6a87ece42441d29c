//! Terminal View
//!
//! This module renders broadcast events for a headless terminal session.
//! Status lines and completed measurements are written to the log output.
use crate::core::events::AppEvent;
use log::{info, warn};
use tokio::sync::broadcast::{error::RecvError, Receiver};

/// Renders status and measurement events until the bus closes.
pub async fn run_status_display(mut events: Receiver<AppEvent>) {
    loop {
        match events.recv().await {
            Ok(AppEvent::Status(message)) => info!("{}", message),
            Ok(AppEvent::Measurement(measurement)) => info!(
                "{} - {} breaths/min",
                measurement.formatted_time(),
                measurement.breaths_per_minute
            ),
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => warn!("display lagged, {} events dropped", missed),
            Err(RecvError::Closed) => break,
        }
    }
}
