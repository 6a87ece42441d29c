//! Controller Module
//!
//! This module defines the traits for the application's core functionalities,
//! including recording control, storage events, and the sensor link driven by
//! the acquisition scheduler. The recording and storage APIs are asynchronous;
//! the sensor link is a blocking seam used from the worker thread.
use crate::core::events::AppEvent;
use crate::model::session::SessionConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::broadcast::Sender;

/// RecordingApi trait
///
/// This trait defines the asynchronous API for managing the recording process in the application.
/// It provides methods to start and stop the recording process.
#[async_trait]
pub trait RecordingApi {
    /// start the recording process
    async fn start_recording(&mut self) -> Result<()>;
    /// stop the recording process
    async fn stop_recording(&mut self) -> Result<()>;
}

/// StorageEventApi trait
///
/// This trait defines the asynchronous API for managing storage-related events in the application.
/// It provides methods to clear storage, load data from a file, and store data to a file.
#[async_trait]
pub trait StorageEventApi {
    /// Clear the storage.
    ///
    /// This method clears all the stored data.
    #[allow(dead_code)]
    async fn clear(&mut self) -> Result<()>;

    /// Load data from a file.
    ///
    /// This method loads data from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A `PathBuf` representing the file path from which to load data.
    #[allow(dead_code)]
    async fn load_from_file(&mut self, path: PathBuf) -> Result<()>;

    /// Store data to a file.
    ///
    /// This method stores data to the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A `PathBuf` representing the file path to which to store data.
    async fn store_to_file(&mut self, path: PathBuf) -> Result<()>;
}

/// SensorLink trait
///
/// This trait defines the blocking seam between the scheduler worker and the
/// physical sensor. Implementations own the connection for the lifetime of a
/// recording; every method blocks the calling thread and must only be used
/// from the worker.
pub trait SensorLink: Sized + Send {
    /// Locate the sensor, open the link, and complete the start-streaming
    /// handshake.
    ///
    /// # Arguments
    ///
    /// * `config` - Session settings carrying the device marker to match.
    /// * `events` - Bus used to report device selection outcomes.
    fn attach(config: &SessionConfig, events: &Sender<AppEvent>) -> Result<Self>;

    /// Discard any bytes buffered on the link but not yet read.
    fn clear_input(&mut self) -> Result<()>;

    /// Read one newline-terminated record, terminator excluded.
    ///
    /// This method blocks until the sensor emits a full line; a silent link
    /// blocks indefinitely.
    fn read_record(&mut self) -> Result<String>;
}
