use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{NotificationPreferences, NotificationStatus};
use crate::tasks::Priority;

/// Fields to change on a notification. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NotificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl UpdateNotificationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status change to `read`, stamped with the time it happened.
    pub fn mark_read(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(NotificationStatus::Read),
            read_at: Some(at),
            ..Self::default()
        }
    }

    /// Status change to `dismissed`, stamped with the time it happened.
    pub fn dismiss(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(NotificationStatus::Dismissed),
            dismissed_at: Some(at),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Fields to change on the notification preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_reminders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_reminders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_suggestions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_timing: Option<u32>,
    /// `Some(None)` turns quiet hours off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours: Option<Option<(String, String)>>,
}

impl UpdatePreferencesRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task_reminders(mut self, enabled: bool) -> Self {
        self.task_reminders = Some(enabled);
        self
    }

    pub fn with_event_reminders(mut self, enabled: bool) -> Self {
        self.event_reminders = Some(enabled);
        self
    }

    pub fn with_ai_suggestions(mut self, enabled: bool) -> Self {
        self.ai_suggestions = Some(enabled);
        self
    }

    pub fn with_email_notifications(mut self, enabled: bool) -> Self {
        self.email_notifications = Some(enabled);
        self
    }

    pub fn with_push_notifications(mut self, enabled: bool) -> Self {
        self.push_notifications = Some(enabled);
        self
    }

    pub fn with_reminder_timing(mut self, minutes: u32) -> Self {
        self.reminder_timing = Some(minutes);
        self
    }

    pub fn with_quiet_hours(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.quiet_hours = Some(Some((start.into(), end.into())));
        self
    }

    pub fn without_quiet_hours(mut self) -> Self {
        self.quiet_hours = Some(None);
        self
    }

    /// Apply updates to existing preferences.
    pub fn apply_to(self, prefs: &mut NotificationPreferences) {
        if let Some(v) = self.task_reminders {
            prefs.task_reminders = v;
        }
        if let Some(v) = self.event_reminders {
            prefs.event_reminders = v;
        }
        if let Some(v) = self.ai_suggestions {
            prefs.ai_suggestions = v;
        }
        if let Some(v) = self.email_notifications {
            prefs.email_notifications = v;
        }
        if let Some(v) = self.push_notifications {
            prefs.push_notifications = v;
        }
        if let Some(v) = self.reminder_timing {
            prefs.reminder_timing = v;
        }
        if let Some(quiet) = self.quiet_hours {
            match quiet {
                Some((start, end)) => {
                    prefs.quiet_hours_start = Some(start);
                    prefs.quiet_hours_end = Some(end);
                }
                None => {
                    prefs.quiet_hours_start = None;
                    prefs.quiet_hours_end = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_mark_read_sets_status_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let value = serde_json::to_value(UpdateNotificationRequest::mark_read(at)).unwrap();

        assert_eq!(value["status"], json!("read"));
        assert!(value.get("readAt").is_some());
        assert!(value.get("dismissedAt").is_none());
    }

    #[test]
    fn test_apply_preferences_update() {
        let mut prefs = NotificationPreferences::default();

        UpdatePreferencesRequest::new()
            .with_reminder_timing(15)
            .with_task_reminders(false)
            .with_quiet_hours("22:00", "07:00")
            .apply_to(&mut prefs);

        assert_eq!(prefs.reminder_timing, 15);
        assert!(!prefs.task_reminders);
        assert!(prefs.event_reminders);
        assert_eq!(prefs.quiet_hours_start.as_deref(), Some("22:00"));
        assert_eq!(prefs.quiet_hours_end.as_deref(), Some("07:00"));
    }

    #[test]
    fn test_without_quiet_hours_clears_both() {
        let mut prefs = NotificationPreferences::default();
        UpdatePreferencesRequest::new()
            .without_quiet_hours()
            .apply_to(&mut prefs);

        assert!(prefs.quiet_hours_start.is_none());
        assert!(prefs.quiet_hours_end.is_none());
    }
}
