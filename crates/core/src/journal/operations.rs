use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::types::{JournalEntry, Mood};

/// Entries written in `[start, end)`.
pub fn entries_in_range(
    entries: &[JournalEntry],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&JournalEntry> {
    entries
        .iter()
        .filter(|entry| entry.created_at >= start && entry.created_at < end)
        .collect()
}

pub fn entries_by_mood(entries: &[JournalEntry], mood: Mood) -> Vec<&JournalEntry> {
    entries
        .iter()
        .filter(|entry| entry.mood == Some(mood))
        .collect()
}

/// Entries written on the given calendar day as seen in `tz`.
pub fn entries_on_day<'a, Tz: TimeZone>(
    entries: &'a [JournalEntry],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a JournalEntry> {
    entries
        .iter()
        .filter(|entry| entry.created_at.with_timezone(tz).date_naive() == day)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn entry(title: &str, created_at: DateTime<Utc>, mood: Option<Mood>) -> JournalEntry {
        let mut entry = JournalEntry::new(title, "");
        entry.created_at = created_at;
        entry.mood = mood;
        entry
    }

    fn titles<'a>(entries: &[&'a JournalEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_entries_in_range_excludes_end() {
        let entries = vec![
            entry("before", at(1, 0) - Duration::seconds(1), None),
            entry("start", at(1, 0), None),
            entry("last", at(3, 0) - Duration::seconds(1), None),
            entry("end", at(3, 0), None),
            entry("after", at(3, 1), None),
        ];

        let found = entries_in_range(&entries, at(1, 0), at(3, 0));

        assert_eq!(titles(&found), vec!["start", "last"]);
    }

    #[test]
    fn test_entries_by_mood() {
        let entries = vec![
            entry("a", at(1, 0), Some(Mood::Happy)),
            entry("b", at(1, 0), Some(Mood::Sad)),
            entry("c", at(1, 0), None),
        ];

        assert_eq!(titles(&entries_by_mood(&entries, Mood::Happy)), vec!["a"]);
    }

    #[test]
    fn test_entries_on_day_respects_timezone() {
        let entries = vec![entry("late", at(1, 23), None), entry("early", at(2, 1), None)];
        let may_2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        assert_eq!(titles(&entries_on_day(&entries, may_2, &Utc)), vec!["early"]);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            titles(&entries_on_day(&entries, may_2, &plus_two)),
            vec!["late", "early"]
        );
    }

    #[test]
    fn test_mood_round_trips_through_str() {
        assert_eq!("Excited".parse::<Mood>(), Ok(Mood::Excited));
        assert_eq!(Mood::Anxious.to_string(), "anxious");
    }
}
