//! Pretty output formatting.

use chrono::{DateTime, Utc};

use prodhub_core::calendar::CalendarEvent;
use prodhub_core::journal::JournalEntry;
use prodhub_core::notes::Note;
use prodhub_core::notifications::{Notification, NotificationPreferences};
use prodhub_core::sharing::ShareSettings;
use prodhub_core::tasks::Task;

const RULE_WIDTH: usize = 40;

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Header, rule and one block per item, or `empty` when there are none.
fn format_list<T>(label: &str, items: &[T], empty: &str, format_item: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    let mut output = format!("{label} ({})\n", items.len());
    output.push_str(&"-".repeat(RULE_WIDTH));
    for item in items {
        output.push_str(&format!("\n{}", format_item(item)));
        output.push('\n');
    }
    output
}

fn push_tags(output: &mut String, tags: &[String]) {
    if !tags.is_empty() {
        output.push_str(&format!("\n  Tags: {}", tags.join(", ")));
    }
}

/// Format a task for display.
pub fn format_task(task: &Task) -> String {
    let check = if task.completed { "x" } else { " " };
    let mut output = format!(
        "[{check}] {} ({})\n  ID: {}",
        task.title, task.priority, task.id
    );
    if let Some(due) = &task.due_date {
        output.push_str(&format!("\n  Due: {}", timestamp(due)));
    }
    if let Some(desc) = &task.description {
        output.push_str(&format!("\n  Description: {desc}"));
    }
    push_tags(&mut output, &task.tags);
    if task.archived {
        output.push_str("\n  Archived");
    }
    output
}

/// Format tasks for display.
pub fn format_tasks(tasks: &[Task]) -> String {
    format_list("TASKS", tasks, "No tasks found.", format_task)
}

/// Format a note for display.
pub fn format_note(note: &Note) -> String {
    let pin = if note.is_pinned { " *" } else { "" };
    let mut output = format!(
        "{}{pin}\n  ID: {}\n  Updated: {}",
        note.title,
        note.id,
        timestamp(&note.updated_at)
    );
    push_tags(&mut output, &note.tags);
    if !note.content.is_empty() {
        output.push_str(&format!("\n  {}", note.content));
    }
    output
}

/// Format notes for display.
pub fn format_notes(notes: &[Note]) -> String {
    format_list("NOTES", notes, "No notes found.", format_note)
}

/// Format a journal entry for display.
pub fn format_journal_entry(entry: &JournalEntry) -> String {
    let mut output = format!(
        "{}\n  ID: {}\n  Written: {}",
        entry.title,
        entry.id,
        timestamp(&entry.created_at)
    );
    if let Some(mood) = &entry.mood {
        output.push_str(&format!("\n  Mood: {mood}"));
    }
    push_tags(&mut output, &entry.tags);
    if entry.is_private {
        output.push_str("\n  Private");
    }
    output
}

/// Format journal entries for display.
pub fn format_journal_entries(entries: &[JournalEntry]) -> String {
    format_list("JOURNAL", entries, "No journal entries found.", format_journal_entry)
}

/// Format an event for display.
pub fn format_event(event: &CalendarEvent) -> String {
    let when = if event.all_day {
        format!("{} (all day)", event.start.format("%Y-%m-%d"))
    } else {
        format!("{} - {}", timestamp(&event.start), timestamp(&event.end))
    };
    let mut output = format!("{}\n  ID: {}\n  When: {when}", event.title, event.id);
    if let Some(loc) = &event.location {
        output.push_str(&format!("\n  Location: {loc}"));
    }
    if let Some(desc) = &event.description {
        output.push_str(&format!("\n  Description: {desc}"));
    }
    output
}

/// Format events for display.
pub fn format_events(events: &[CalendarEvent]) -> String {
    format_list("EVENTS", events, "No events found.", format_event)
}

/// Format a notification for display.
pub fn format_notification(notification: &Notification) -> String {
    let mut output = format!(
        "{} [{} | {} | {}]\n  ID: {}",
        notification.title,
        notification.kind,
        notification.priority,
        notification.status,
        notification.id
    );
    if !notification.message.is_empty() {
        output.push_str(&format!("\n  {}", notification.message));
    }
    if let Some(at) = &notification.scheduled_for {
        output.push_str(&format!("\n  Scheduled for: {}", timestamp(at)));
    }
    output
}

/// Format notifications for display.
pub fn format_notifications(notifications: &[Notification]) -> String {
    format_list(
        "NOTIFICATIONS",
        notifications,
        "No notifications found.",
        format_notification,
    )
}

/// Format notification preferences for display.
pub fn format_preferences(prefs: &NotificationPreferences) -> String {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    let quiet = match (&prefs.quiet_hours_start, &prefs.quiet_hours_end) {
        (Some(start), Some(end)) => format!("{start} - {end}"),
        _ => "off".to_string(),
    };
    format!(
        "PREFERENCES\n  Task reminders: {}\n  Event reminders: {}\n  AI suggestions: {}\n  \
         Email: {}\n  Push: {}\n  Remind before: {} min\n  Quiet hours: {quiet}",
        on_off(prefs.task_reminders),
        on_off(prefs.event_reminders),
        on_off(prefs.ai_suggestions),
        on_off(prefs.email_notifications),
        on_off(prefs.push_notifications),
        prefs.reminder_timing,
    )
}

/// Format a resource's share settings for display.
pub fn format_share_settings(settings: &ShareSettings) -> String {
    let mut output = format!(
        "{} {}\n  Updated: {}",
        settings.resource_type,
        settings.resource_id,
        timestamp(&settings.updated_at)
    );
    if settings.shared_with.is_empty() {
        output.push_str("\n  Not shared");
    }
    for entry in &settings.shared_with {
        output.push_str(&format!("\n  {} ({})", entry.email, entry.permission));
    }
    output
}

/// Format share settings for display.
pub fn format_shares(shares: &[ShareSettings]) -> String {
    format_list("SHARES", shares, "Nothing shared.", format_share_settings)
}
