//! Time-related utility functions.
//!
//! Helpers for the maintenance schedule and for reasoning about file ages.

use std::time::{Duration, SystemTime};

/// Delay until the next point that is phase-aligned to `reference`.
///
/// Sweeps land on the grid `reference + k * interval` rather than drifting
/// with process start time, so a cache restarted every few minutes still
/// sweeps on the same wall-clock cadence. Returns zero when `now` is exactly
/// on the grid, and zero for a zero `interval`.
///
/// A `reference` in the future is treated as the grid origin as well: the
/// delay is measured backwards from it so the result stays within
/// `[0, interval)`.
///
/// ```
/// use std::time::{Duration, SystemTime};
/// use tilecache::time::phase_aligned_delay;
///
/// let reference = SystemTime::UNIX_EPOCH;
/// let now = reference + Duration::from_secs(125);
/// let delay = phase_aligned_delay(now, reference, Duration::from_secs(60));
/// assert_eq!(delay, Duration::from_secs(55));
/// ```
pub fn phase_aligned_delay(now: SystemTime, reference: SystemTime, interval: Duration) -> Duration {
    let interval_nanos = interval.as_nanos();
    if interval_nanos == 0 {
        return Duration::ZERO;
    }

    match now.duration_since(reference) {
        Ok(elapsed) => {
            let phase = elapsed.as_nanos() % interval_nanos;
            if phase == 0 {
                Duration::ZERO
            } else {
                nanos_to_duration(interval_nanos - phase)
            }
        }
        // Reference is ahead of us: the next grid point at or after `now`
        // is `reference - k * interval`.
        Err(e) => nanos_to_duration(e.duration().as_nanos() % interval_nanos),
    }
}

/// Age of a timestamp relative to `now`, or zero if it lies in the future.
pub fn age(now: SystemTime, timestamp: SystemTime) -> Duration {
    now.duration_since(timestamp).unwrap_or(Duration::ZERO)
}

fn nanos_to_duration(nanos: u128) -> Duration {
    // `nanos` is always below an existing Duration's nanos, so it fits.
    let secs = (nanos / 1_000_000_000) as u64;
    let sub = (nanos % 1_000_000_000) as u32;
    Duration::new(secs, sub)
}
