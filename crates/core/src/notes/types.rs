use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{placeholder_id, validate_title, Record, Searchable, ValidationError};
use crate::serde::deserialize_timestamp;

/// A free-form note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Content was dictated rather than typed.
    #[serde(default)]
    pub voice_transcription: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: placeholder_id(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            voice_transcription: false,
            is_pinned: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
    }

    pub fn transcribed(mut self) -> Self {
        self.voice_transcription = true;
        self
    }
}

impl Record for Note {
    const COLLECTION: &'static str = "notes";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Pinned notes first, then newest first.
    fn sort_snapshot(records: &mut [Self]) {
        records.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }
}

impl Searchable for Note {
    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.content
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn note(title: &str, pinned: bool, age_hours: i64) -> Note {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut note = Note::new(title, "");
        note.is_pinned = pinned;
        note.created_at = base - Duration::hours(age_hours);
        note
    }

    #[test]
    fn test_sort_pinned_then_newest() {
        let mut notes = vec![
            note("old", false, 10),
            note("pinned-old", true, 20),
            note("new", false, 1),
            note("pinned-new", true, 2),
        ];

        Note::sort_snapshot(&mut notes);

        let titles: Vec<_> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["pinned-new", "pinned-old", "new", "old"]);
    }

    #[test]
    fn test_validate_requires_title() {
        assert_eq!(
            Note::new(" ", "body").validate(),
            Err(ValidationError::EmptyTitle)
        );
        assert!(Note::new("Ideas", "").validate().is_ok());
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let value = serde_json::json!({
            "id": "n1",
            "title": "t",
            "content": "c",
            "createdAt": "2024-05-01T00:00:00Z",
            "updatedAt": "2024-05-01T00:00:00Z"
        });

        let note: Note = serde_json::from_value(value).unwrap();

        assert!(!note.is_pinned);
        assert!(!note.is_archived);
        assert!(!note.voice_transcription);
    }
}
