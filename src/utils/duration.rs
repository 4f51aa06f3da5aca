//! Duration helpers for API responses.

use std::time::Duration;

const HOUR: Duration = Duration::from_secs(3600);

/// Rounds `duration` up to whole minutes.
///
/// A window with 10 seconds left reports 1 minute, never 0.
pub fn whole_minutes(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.div_ceil(60)
}

/// Converts a whole number of hours into a [`Duration`].
///
/// Returns `None` on overflow.
pub fn hours(hours: u64) -> Option<Duration> {
    hours.checked_mul(HOUR.as_secs()).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_minutes_rounds_up() {
        assert_eq!(whole_minutes(Duration::ZERO), 0);
        assert_eq!(whole_minutes(Duration::from_millis(1)), 1);
        assert_eq!(whole_minutes(Duration::from_secs(60)), 1);
        assert_eq!(whole_minutes(Duration::from_secs(61)), 2);
        assert_eq!(whole_minutes(Duration::from_secs(30 * 60)), 30);
    }

    #[test]
    fn test_hours() {
        assert_eq!(hours(24), Some(Duration::from_secs(86_400)));
        assert_eq!(hours(0), Some(Duration::ZERO));
        assert_eq!(hours(u64::MAX), None);
    }
}
