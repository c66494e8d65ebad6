//! The run's single notion of "now" and the optional scheduling guard.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

/// Instant the run started, in the configured zone.
///
/// Computed once in `main` and passed down; pipeline code never reads the
/// wall clock itself.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    now: DateTime<Tz>,
}

impl RunClock {
    pub fn now(zone: Tz) -> Self {
        Self::at(Utc::now().with_timezone(&zone))
    }

    pub fn at(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    pub fn instant(&self) -> DateTime<Tz> {
        self.now
    }

    /// `YYYY-MM-DD`, the key for prepared content and the archive date.
    pub fn date_key(&self) -> String {
        self.now.format("%Y-%m-%d").to_string()
    }

    /// Human date used in the subject and footer, e.g. `7. 3. 2025`.
    pub fn date_human(&self) -> String {
        self.now.format("%-d. %-m. %Y").to_string()
    }
}

/// Restricts a run to a narrow window around a fixed local time.
#[derive(Debug, Clone, Copy)]
pub struct TimeGuard {
    pub enabled: bool,
    pub hour: u32,
    pub minute: u32,
    /// Minutes accepted on either side of `minute`.
    pub tolerance: u32,
}

impl TimeGuard {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            hour: 8,
            minute: 30,
            tolerance: 1,
        }
    }

    /// Whether the run may proceed at the clock's instant.
    pub fn permits(&self, clock: &RunClock) -> bool {
        if !self.enabled {
            return true;
        }
        let now = clock.instant();
        now.hour() == self.hour && now.minute().abs_diff(self.minute) <= self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Prague;

    use super::*;

    fn clock(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> RunClock {
        RunClock::at(Prague.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
    }

    #[test]
    fn date_key_is_zero_padded() {
        assert_eq!(clock(2025, 3, 7, 8, 30).date_key(), "2025-03-07");
    }

    #[test]
    fn date_human_has_no_padding() {
        assert_eq!(clock(2025, 3, 7, 8, 30).date_human(), "7. 3. 2025");
        assert_eq!(clock(2025, 11, 23, 8, 30).date_human(), "23. 11. 2025");
    }

    #[test]
    fn date_follows_configured_zone() {
        // 23:30 UTC on Dec 31 is already Jan 1 in Prague.
        let utc = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        let clock = RunClock::at(utc.with_timezone(&Prague));
        assert_eq!(clock.date_key(), "2025-01-01");
    }

    #[test]
    fn disabled_guard_always_permits() {
        let guard = TimeGuard::new(false);
        assert!(guard.permits(&clock(2025, 3, 7, 3, 0)));
    }

    #[test]
    fn guard_accepts_one_minute_either_side() {
        let guard = TimeGuard::new(true);
        assert!(guard.permits(&clock(2025, 3, 7, 8, 29)));
        assert!(guard.permits(&clock(2025, 3, 7, 8, 30)));
        assert!(guard.permits(&clock(2025, 3, 7, 8, 31)));
        assert!(!guard.permits(&clock(2025, 3, 7, 8, 28)));
        assert!(!guard.permits(&clock(2025, 3, 7, 8, 32)));
        assert!(!guard.permits(&clock(2025, 3, 7, 9, 30)));
    }
}
