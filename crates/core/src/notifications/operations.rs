use super::types::{Notification, NotificationKind, NotificationStatus};
use crate::tasks::Priority;

pub fn unread(notifications: &[Notification]) -> Vec<&Notification> {
    notifications
        .iter()
        .filter(|n| n.status == NotificationStatus::Unread)
        .collect()
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications
        .iter()
        .filter(|n| n.status == NotificationStatus::Unread)
        .count()
}

pub fn by_kind(notifications: &[Notification], kind: NotificationKind) -> Vec<&Notification> {
    notifications.iter().filter(|n| n.kind == kind).collect()
}

pub fn by_priority(notifications: &[Notification], priority: Priority) -> Vec<&Notification> {
    notifications
        .iter()
        .filter(|n| n.priority == priority)
        .collect()
}
