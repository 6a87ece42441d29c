//! Argument parsing for running from the command line

use crate::core::constants::DEFAULT_DEVICE_MARKER;
use crate::model::session::SessionConfig;
use clap::Parser;
use std::path::PathBuf;

/// Respiration rate tracker for serial-attached breathing sensors.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Minutes between acquisition cycles
    #[clap(short, long, default_value_t = 1)]
    #[clap(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
    /// Substring matched against serial device descriptions to locate the sensor
    #[clap(short, long, default_value = DEFAULT_DEVICE_MARKER)]
    pub marker: String,
    /// Measurement log destination, defaults to a timestamped file in the working directory
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

impl From<Args> for SessionConfig {
    fn from(args: Args) -> Self {
        SessionConfig {
            interval_minutes: args.interval,
            device_marker: args.marker,
            output: args
                .output
                .unwrap_or_else(SessionConfig::default_output_path),
        }
    }
}
