//! Application Component
//!
//! This module defines the main component responsible for orchestrating the
//! tracker. It starts the recording controller, dispatches application-level
//! events, and coordinates the graceful shutdown on Ctrl-C.

use crate::{
    api::{
        controller::{RecordingApi, StorageEventApi},
        model::{MeasurementModelApi, ModelHandle},
    },
    components::storage::StorageComponent,
    core::events::{AppEvent, RecordingEvent},
};

use anyhow::Result;
use log::{error, trace, warn};
use tokio::sync::broadcast::{error::RecvError, Sender};

/// Main application component.
///
/// This structure manages the lifecycle of the recording controller and
/// handles application-level events until shutdown.
pub struct AppComponent<R: RecordingApi + Send> {
    recorder: R,
    storage: ModelHandle<StorageComponent>,
    event_bus: Sender<AppEvent>,
}

impl<R: RecordingApi + Send> AppComponent<R> {
    /// Creates a new `AppComponent`.
    ///
    /// # Arguments
    /// - `recorder`: The recording controller driven by lifecycle events.
    /// - `storage`: Shared storage, flushed once more on shutdown.
    /// - `event_bus`: The event bus for broadcasting application events.
    pub fn new(
        recorder: R,
        storage: ModelHandle<StorageComponent>,
        event_bus: Sender<AppEvent>,
    ) -> Self {
        trace!("Initializing AppComponent.");
        Self {
            recorder,
            storage,
            event_bus,
        }
    }

    /// Dispatches application-level events to the recording controller.
    async fn dispatch_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Recording(RecordingEvent::StartRecording) => {
                self.recorder.start_recording().await
            }
            AppEvent::Recording(RecordingEvent::StopRecording) => {
                self.recorder.stop_recording().await
            }
            _ => Ok(()),
        }
    }

    /// Runs the tracker until Ctrl-C or a stop event arrives.
    pub async fn run(mut self) -> Result<()> {
        let mut events = self.event_bus.subscribe();
        self.recorder.start_recording().await?;
        let _ = self.event_bus.send(AppEvent::Status(
            "Recording started, press Ctrl-C to finish.".to_string(),
        ));
        loop {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        error!("could not listen for the shutdown signal: {}", e);
                    }
                    break;
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        let stop =
                            matches!(event, AppEvent::Recording(RecordingEvent::StopRecording));
                        if let Err(e) = self.dispatch_event(event).await {
                            error!(
                                "error during event handling: {}\nbacktrace:\n{}",
                                e,
                                e.backtrace()
                            );
                        }
                        if stop {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("event loop lagged, {} events dropped", missed)
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
        self.finish().await
    }

    /// Stops the recording, flushes the log once more, and reports the
    /// session summary.
    async fn finish(&mut self) -> Result<()> {
        let _ = self.event_bus.send(AppEvent::Status(
            "Finishing: waiting for the current cycle to complete...".to_string(),
        ));
        self.recorder.stop_recording().await?;
        let (count, elapsed, output) = {
            let mut storage = self.storage.write().await;
            let output = storage.output().to_path_buf();
            // The worker's last write may have failed; store the full state
            // once more.
            if let Err(e) = storage.store_to_file(output.clone()).await {
                warn!("final flush failed: {}", e);
            }
            (
                storage.get_measurements().len(),
                storage.get_elapsed_time(),
                output,
            )
        };
        let _ = self.event_bus.send(AppEvent::Status(format!(
            "Finished :) {} measurements over {}s saved to {}.",
            count,
            elapsed.whole_seconds(),
            output.display()
        )));
        Ok(())
    }
}
