use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::types::CalendarEvent;

/// Default look-ahead of [`upcoming_events`], in days.
pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// Events lying entirely within `[start, end]`.
pub fn events_in_range(
    events: &[CalendarEvent],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&CalendarEvent> {
    events
        .iter()
        .filter(|event| event.start >= start && event.end <= end)
        .collect()
}

/// Events starting between `now` and `now + days`, both inclusive.
pub fn upcoming_events(events: &[CalendarEvent], now: DateTime<Utc>, days: i64) -> Vec<&CalendarEvent> {
    let until = now + Duration::days(days);
    events
        .iter()
        .filter(|event| event.start >= now && event.start <= until)
        .collect()
}

/// First and last instant of a calendar day in `tz`.
///
/// Returns `None` if midnight does not exist in `tz` on that day.
pub fn day_bounds<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = tz.from_local_datetime(&day.and_hms_opt(0, 0, 0)?).earliest()?;
    let next = tz
        .from_local_datetime(&day.succ_opt()?.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    Some((
        start.with_timezone(&Utc),
        next.with_timezone(&Utc) - Duration::milliseconds(1),
    ))
}

/// Events overlapping the given calendar day in `tz`.
pub fn events_for_day<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a CalendarEvent> {
    let Some((day_start, day_end)) = day_bounds(day, tz) else {
        return Vec::new();
    };
    events
        .iter()
        .filter(|event| event.start <= day_end && event.end >= day_start)
        .collect()
}

/// Events starting within seven days of `week_start`, both ends inclusive.
pub fn events_for_week(events: &[CalendarEvent], week_start: DateTime<Utc>) -> Vec<&CalendarEvent> {
    let week_end = week_start + Duration::days(7);
    events
        .iter()
        .filter(|event| event.start >= week_start && event.start <= week_end)
        .collect()
}
