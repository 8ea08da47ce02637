//! Time sources.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, Timelike, Utc};

/// Source of the current time.
///
/// The gateway stamps `createdAt`/`updatedAt` from its clock, and the
/// reminder scheduler uses it for due-date windows and quiet hours.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Hour of day (0-23) in the user's local time zone.
    fn local_hour(&self) -> u32;
}

/// Wall clock. Local hour comes from the host time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// A clock that only moves when told to. Local hour is the UTC hour.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn local_hour(&self) -> u32 {
        self.now().hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let clock = ManualClock::new(start);

        clock.advance(Duration::minutes(45));

        assert_eq!(clock.now(), start + Duration::minutes(45));
        assert_eq!(clock.local_hour(), 10);
    }

    #[test]
    fn manual_clock_set_replaces_time() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let later = Utc.with_ymd_and_hms(2024, 3, 2, 23, 15, 0).unwrap();

        clock.set(later);

        assert_eq!(clock.now(), later);
        assert_eq!(clock.local_hour(), 23);
    }
}
