mod operations;
mod reminders;
mod requests;
mod types;

pub use operations::{by_kind, by_priority, unread, unread_count};
pub use reminders::{
    event_start_reminder, has_reminder, task_due_reminder, QuietHours, ReminderWindow, TimeOfDay,
};
pub use requests::{UpdateNotificationRequest, UpdatePreferencesRequest};
pub use types::{
    Notification, NotificationAction, NotificationKind, NotificationPreferences,
    NotificationStatus, PREFERENCES_COLLECTION, PREFERENCES_DOCUMENT_ID,
};
