//! Measurement Storage Module
//!
//! This module persists the running measurement log. Every recorded
//! measurement rewrites the full session document, so a crash at any point
//! leaves the previous complete state on disk.
use crate::api::controller::StorageEventApi;
use crate::api::model::MeasurementModelApi;
use crate::model::session::{RateMeasurement, SessionData};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::trace;
use std::fs;
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};

/// Stores the session log and mirrors it to disk.
#[derive(Debug)]
pub struct StorageComponent {
    session: SessionData,
    output: PathBuf,
}

impl StorageComponent {
    /// Creates a storage component writing to `output`.
    pub fn new(output: PathBuf) -> Self {
        Self {
            session: SessionData::default(),
            output,
        }
    }

    /// Appends a measurement and rewrites the log file.
    ///
    /// The append itself cannot fail; only the disk write can, and the
    /// caller decides whether that is fatal.
    pub fn record(&mut self, measurement: RateMeasurement) -> Result<()> {
        self.session.add_measurement(measurement);
        self.flush()
    }

    /// Rewrites the full session document at the configured path.
    pub fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.session)?;
        fs::write(&self.output, json)?;
        trace!("session log written to {}", self.output.display());
        Ok(())
    }

    /// Path the log is written to.
    pub fn output(&self) -> &Path {
        &self.output
    }
}

#[async_trait]
impl StorageEventApi for StorageComponent {
    async fn clear(&mut self) -> Result<()> {
        self.session = SessionData::default();
        Ok(())
    }

    async fn load_from_file(&mut self, path: PathBuf) -> Result<()> {
        let json = tokio::fs::read_to_string(&path).await?;
        self.session = tokio::task::spawn_blocking(move || {
            let serde_result: Result<SessionData, serde_json::Error> =
                serde_json::from_str(json.as_str());
            serde_result
        })
        .await??;
        Ok(())
    }

    async fn store_to_file(&mut self, path: PathBuf) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.session)?;
        tokio::fs::write(&path, json).await.map_err(|e| anyhow!(e))
    }
}

impl MeasurementModelApi for StorageComponent {
    fn get_start_time(&self) -> &OffsetDateTime {
        self.session.start_time()
    }

    fn get_measurements(&self) -> &[RateMeasurement] {
        self.session.measurements()
    }

    fn get_last_measurement(&self) -> Option<&RateMeasurement> {
        self.session.measurements().last()
    }

    fn get_elapsed_time(&self) -> Duration {
        OffsetDateTime::now_utc() - *self.session.start_time()
    }
}
