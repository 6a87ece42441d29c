use std::time::Duration;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Baud rate expected by the respiration sensor firmware.
pub const SENSOR_BAUD_RATE: u32 = 115_200;
/// Handshake byte that switches the sensor into streaming mode.
pub const START_STREAMING_COMMAND: u8 = b'2';
/// Grace period after opening the port; opening the link resets the sensor,
/// so the handshake must wait at least this long.
pub const PORT_SETTLE_DELAY: Duration = Duration::from_secs(3);
/// Length of one observation window from which a rate is derived.
pub const OBSERVATION_WINDOW: Duration = Duration::from_secs(30);
/// Marker matched against device descriptions when none is configured.
pub const DEFAULT_DEVICE_MARKER: &str = "Arduino";
/// Idle sleep between the scheduler's cancel and trigger checks.
pub const SCHEDULER_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Poll timeout on the OS port handle. Line reads retry on expiry, so this
/// does not bound how long a read may block overall.
pub const PORT_POLL_TIMEOUT: Duration = Duration::from_millis(500);
/// Wall-clock format for displayed measurement timestamps.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
/// Timestamp embedded in the default output filename.
pub const FILE_STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]_[month]_[day]-[hour]_[minute]");
