use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{placeholder_id, validate_title, Record, Searchable, ValidationError};
use crate::serde::{deserialize_optional_string, deserialize_timestamp};

/// Where an event originated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    #[default]
    Local,
    Google,
    Icloud,
}

/// How a per-event reminder is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    Email,
    Notification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReminder {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub channel: ReminderChannel,
}

/// A calendar event, possibly linked to tasks and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_string"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_string"
    )]
    pub location: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default)]
    pub note_ids: Vec<String>,
    #[serde(default)]
    pub reminders: Vec<EventReminder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub source: EventSource,
    /// Identifier in the originating calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: placeholder_id(),
            title: title.into(),
            start,
            end,
            description: None,
            location: None,
            all_day: false,
            task_ids: Vec::new(),
            note_ids: Vec::new(),
            reminders: Vec::new(),
            color: None,
            source: EventSource::Local,
            source_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn all_day(mut self) -> Self {
        self.all_day = true;
        self
    }

    pub fn linked_to_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_ids.push(task_id.into());
        self
    }

    pub fn linked_to_note(mut self, note_id: impl Into<String>) -> Self {
        self.note_ids.push(note_id.into());
        self
    }

    pub fn with_reminder(mut self, time: DateTime<Utc>, channel: ReminderChannel) -> Self {
        self.reminders.push(EventReminder { time, channel });
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl Record for CalendarEvent {
    const COLLECTION: &'static str = "calendar_events";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Chronological by start.
    fn sort_snapshot(records: &mut [Self]) {
        records.sort_by_key(|event| event.start);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        if self.end < self.start {
            return Err(ValidationError::InvalidTimeRange);
        }
        Ok(())
    }
}

impl Searchable for CalendarEvent {
    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}
