//! Respiration Rate Tracker
//!
//! This tool samples a serial-attached respiration sensor on a repeating
//! interval, derives breaths per minute from the raw waveform, and persists
//! the running measurement log. It integrates modules for serial
//! communication, breath detection, scheduling, and storage.

use api::model::ModelHandle;
use args::Args;
use clap::Parser;
use components::{
    acquisition::AcquisitionComponent, application::AppComponent, scheduler::SchedulerComponent,
    storage::StorageComponent,
};
use env_logger::Env;
use log::error;
#[cfg(feature = "mock")]
use components::serial::MockSensor;
#[cfg(not(feature = "mock"))]
use components::serial::SerialSensor;

use model::session::SessionConfig;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::{broadcast, RwLock};

/// Command line argument definitions.
mod args;

/// Core utilities and types used throughout the application.
mod core {
    /// Application-wide constants.
    pub mod constants;
    /// Event system for inter-module communication.
    pub mod events;
}

/// Trait seams between the control surface and the components.
mod api {
    /// Mutating controller APIs.
    pub mod controller;
    /// Read-only model APIs.
    pub mod model;
}

/// Mathematical utilities for rate computation.
mod math {
    /// Breath detection and rate scaling.
    pub mod respiration;
}

/// Data models representing the application's domain.
mod model {
    /// Model for serial device selection and record decoding.
    pub mod serial;
    /// Model for session configuration and measurement data.
    pub mod session;
}

/// Components implementing the application's behavior.
mod components {
    /// Runs individual observation windows.
    pub mod acquisition;
    /// Entry point component orchestrating the application flow.
    pub mod application;
    /// Interval scheduling and recording control.
    pub mod scheduler;
    /// Serial link to the respiration sensor.
    pub mod serial;
    /// Persistence of the measurement log.
    pub mod storage;
}

/// Output for a headless terminal session.
mod view {
    /// Status and measurement rendering.
    pub mod terminal;
}

/// Main entry point of the application.
///
/// Initializes logging, sets up the asynchronous runtime, wires the
/// components together, and runs the tracker until shutdown.
fn main() {
    // Initialize logger with environment-specific settings.
    env_logger::Builder::from_env(
        Env::default()
            .filter_or("RESP_LOG_LEVEL", "info")
            .write_style_or("RESP_LOG_STYLE", "always"),
    )
    .init();

    let args = Args::parse();

    // Create a new Tokio runtime for asynchronous operations.
    let rt = Runtime::new().expect("Unable to create Runtime");
    let _enter = rt.enter();

    // Shared session configuration, re-read by the scheduler each cycle.
    let config = SessionConfig::from(args);
    let output = config.output.clone();
    let config: ModelHandle<SessionConfig> = Arc::new(RwLock::new(config));

    // Shared storage, written by the worker and flushed once more on shutdown.
    let storage: ModelHandle<StorageComponent> =
        Arc::new(RwLock::new(StorageComponent::new(output)));

    let (event_bus, _) = broadcast::channel(16);

    // Initialize the recording controller with the configured sensor link.
    #[cfg(feature = "mock")]
    let scheduler = SchedulerComponent::<MockSensor>::new(
        event_bus.clone(),
        config.clone(),
        storage.clone(),
        AcquisitionComponent::new(event_bus.clone()),
    );
    #[cfg(not(feature = "mock"))]
    let scheduler = SchedulerComponent::<SerialSensor>::new(
        event_bus.clone(),
        config.clone(),
        storage.clone(),
        AcquisitionComponent::new(event_bus.clone()),
    );

    let app = AppComponent::new(scheduler, storage, event_bus.clone());

    // Render status lines and measurements while the tracker runs.
    rt.spawn(view::terminal::run_status_display(event_bus.subscribe()));

    if let Err(e) = rt.block_on(app.run()) {
        error!(
            "tracker stopped with error: {}\nbacktrace:\n{}",
            e,
            e.backtrace()
        );
        std::process::exit(1);
    }
}
