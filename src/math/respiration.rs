//! Respiration Rate Computation
//!
//! This module contains the breath detection and rate scaling functions.
//! Breaths are detected from the raw sample waveform as transitions out of
//! the zero-valued exhale baseline.

use log::trace;
use std::time::Duration;

/// `count_breath_onsets` function.
///
/// Counts breath onsets in a sample window. An onset is a sample with a
/// positive value whose predecessor was exactly zero; the first sample has no
/// predecessor and is never an onset.
///
/// # Arguments
/// - `values`: Sample values in arrival order.
///
/// # Returns
/// Number of detected onsets as a `usize`.
pub fn count_breath_onsets(values: &[f64]) -> usize {
    let onsets = values
        .windows(2)
        .filter(|pair| pair[0] == 0.0 && pair[1] > 0.0)
        .count();
    trace!("Detected {} onsets in {} samples.", onsets, values.len());
    onsets
}

/// `rate_per_minute` function.
///
/// Scales an onset count over one observation window to breaths per minute.
///
/// # Arguments
/// - `onsets`: Number of breath onsets detected in the window.
/// - `window`: Length of the observation window.
///
/// # Returns
/// The rounded rate in breaths per minute as a `u32`.
///
/// # Panics
/// Panics if the window is zero-length.
pub fn rate_per_minute(onsets: usize, window: Duration) -> u32 {
    assert!(
        !window.is_zero(),
        "Rate scaling requires a non-empty observation window."
    );
    (onsets as f64 * (60.0 / window.as_secs_f64())).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onsets_counted_on_zero_to_positive_transitions() {
        // Onsets at indices 2, 5 and 7.
        let values = [0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 3.0];
        assert_eq!(count_breath_onsets(&values), 3);
    }

    #[test]
    fn test_first_sample_is_never_an_onset() {
        // A window that opens mid-breath only counts later onsets.
        assert_eq!(count_breath_onsets(&[5.0, 0.0, 3.0]), 1);
        assert_eq!(count_breath_onsets(&[7.0]), 0);
    }

    #[test]
    fn test_windows_without_baseline_exits_count_nothing() {
        assert_eq!(count_breath_onsets(&[0.0; 8]), 0);
        assert_eq!(count_breath_onsets(&[2.0, 3.0, 1.0, 4.0]), 0);
        assert_eq!(count_breath_onsets(&[0.0, -2.0, 0.0, -1.0]), 0);
        assert_eq!(count_breath_onsets(&[]), 0);
    }

    #[test]
    fn test_rate_doubles_onsets_for_thirty_second_window() {
        let window = Duration::from_secs(30);
        for onsets in 0..12 {
            assert_eq!(rate_per_minute(onsets, window), onsets as u32 * 2);
        }
    }

    #[test]
    fn test_rate_scales_with_window_length() {
        assert_eq!(rate_per_minute(2, Duration::from_secs(30)), 4);
        assert_eq!(rate_per_minute(3, Duration::from_secs(60)), 3);
        assert_eq!(rate_per_minute(1, Duration::from_secs(15)), 4);
    }
}
