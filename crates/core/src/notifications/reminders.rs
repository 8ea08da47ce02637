//! The reminder eligibility window.
//!
//! A reminder for something due at `due` may fire at `now` when
//! `0 < due - now <= lead` and the local hour is outside quiet hours.
//!
//! Quiet hours are `[start, end)` in whole local hours. When `start > end`
//! the quiet period spans midnight (`22:00`–`07:00` is quiet at night).
//! When `start == end` there are no quiet hours.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use super::types::{Notification, NotificationAction, NotificationKind, NotificationPreferences};
use crate::calendar::CalendarEvent;
use crate::record::ValidationError;
use crate::tasks::{Priority, Task};

/// A wall-clock time parsed from `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Parses `HH:mm` (also accepts a bare `HH`).
    ///
    /// # Examples
    ///
    /// ```
    /// use prodhub_core::notifications::TimeOfDay;
    ///
    /// assert_eq!(TimeOfDay::parse("08:30").unwrap().hour, 8);
    /// assert!(TimeOfDay::parse("25:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTimeOfDay(s.to_string());
        let (hour, minute) = match s.trim().split_once(':') {
            Some((h, m)) => (h, m),
            None => (s.trim(), "0"),
        };
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

/// Hours of the day during which reminders are held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl QuietHours {
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            start: TimeOfDay::parse(start)?,
            end: TimeOfDay::parse(end)?,
        })
    }

    /// True when reminders may fire at `hour` (local, 0-23).
    pub fn allows(&self, hour: u32) -> bool {
        let (start, end) = (self.start.hour, self.end.hour);
        if start <= end {
            hour < start || hour >= end
        } else {
            hour >= end && hour < start
        }
    }
}

/// Lead time plus optional quiet hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub lead: Duration,
    pub quiet_hours: Option<QuietHours>,
}

impl ReminderWindow {
    pub fn new(lead: Duration) -> Self {
        Self {
            lead,
            quiet_hours: None,
        }
    }

    pub fn with_quiet_hours(mut self, quiet_hours: QuietHours) -> Self {
        self.quiet_hours = Some(quiet_hours);
        self
    }

    /// Builds the window from stored preferences.
    ///
    /// Quiet hours apply only when both bounds are set.
    pub fn from_preferences(prefs: &NotificationPreferences) -> Result<Self, ValidationError> {
        let window = Self::new(Duration::minutes(i64::from(prefs.reminder_timing)));
        match (&prefs.quiet_hours_start, &prefs.quiet_hours_end) {
            (Some(start), Some(end)) => Ok(window.with_quiet_hours(QuietHours::parse(start, end)?)),
            _ => Ok(window),
        }
    }

    /// True when a reminder for `due` may fire at `now`, given the local
    /// hour at `now`.
    pub fn is_eligible(&self, due: DateTime<Utc>, now: DateTime<Utc>, local_hour: u32) -> bool {
        let remaining = due - now;
        if remaining <= Duration::zero() || remaining > self.lead {
            return false;
        }
        self.quiet_hours
            .is_none_or(|quiet| quiet.allows(local_hour))
    }
}

/// True when a reminder for this resource and due time already exists.
pub fn has_reminder(notifications: &[Notification], resource_id: &str, scheduled_for: DateTime<Utc>) -> bool {
    notifications.iter().any(|n| {
        n.resource_id.as_deref() == Some(resource_id) && n.scheduled_for == Some(scheduled_for)
    })
}

/// "Task Due Soon" reminder for a task with a due date.
pub fn task_due_reminder(task: &Task, due: DateTime<Utc>, lead_minutes: u32) -> Notification {
    Notification::new(
        NotificationKind::Task,
        "Task Due Soon",
        format!("Task \"{}\" is due in {lead_minutes} minutes", task.title),
    )
    .with_priority(Priority::High)
    .for_resource("task", task.id.clone())
    .scheduled_for(due)
    .with_action(NotificationAction::new("View Task", "view").with_data(json!({"taskId": task.id})))
    .with_action(
        NotificationAction::new("Mark Complete", "complete").with_data(json!({"taskId": task.id})),
    )
}

/// "Upcoming Event" reminder for an event.
pub fn event_start_reminder(event: &CalendarEvent, lead_minutes: u32) -> Notification {
    Notification::new(
        NotificationKind::Event,
        "Upcoming Event",
        format!("Event \"{}\" starts in {lead_minutes} minutes", event.title),
    )
    .with_priority(Priority::Medium)
    .for_resource("event", event.id.clone())
    .scheduled_for(event.start)
    .with_action(
        NotificationAction::new("View Event", "view").with_data(json!({"eventId": event.id})),
    )
}
