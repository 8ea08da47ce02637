//! Notification CLI commands.

use clap::{Args, Parser, Subcommand};

use prodhub_core::notifications::{NotificationKind, UpdatePreferencesRequest};
use prodhub_core::tasks::Priority;

use super::{found, OutputFormat};
use crate::context::AppContext;
use crate::error::Result;
use crate::output::{pretty, render};

/// Notification commands.
#[derive(Debug, Parser)]
pub struct NotificationsCommand {
    #[command(subcommand)]
    pub action: NotificationsAction,
}

/// Available notification actions.
#[derive(Debug, Subcommand)]
pub enum NotificationsAction {
    /// List notifications.
    List {
        /// Only unread notifications.
        #[arg(long)]
        unread: bool,
        /// task, event, ai or system.
        #[arg(long)]
        kind: Option<NotificationKind>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Number of unread notifications.
    Count,
    /// Get notification by ID.
    Get {
        id: String,
    },
    /// Mark a notification as read.
    Read {
        id: String,
    },
    /// Mark every notification as read.
    ReadAll,
    /// Dismiss a notification.
    Dismiss {
        id: String,
    },
    /// Delete notification by ID.
    Delete {
        id: String,
    },
    /// Run one reminder check now.
    Check,
    /// Show reminder preferences.
    Preferences,
    /// Change reminder preferences.
    Configure(ConfigureArgs),
}

/// Preference changes; omitted flags are left as they are.
#[derive(Debug, Args)]
pub struct ConfigureArgs {
    #[arg(long)]
    pub task_reminders: Option<bool>,
    #[arg(long)]
    pub event_reminders: Option<bool>,
    #[arg(long)]
    pub ai_suggestions: Option<bool>,
    #[arg(long)]
    pub email: Option<bool>,
    #[arg(long)]
    pub push: Option<bool>,
    /// Minutes before the due time to remind.
    #[arg(long)]
    pub remind_before: Option<u32>,
    /// Quiet hours as HH:MM-HH:MM.
    #[arg(long, conflicts_with = "no_quiet_hours", value_parser = parse_quiet_hours)]
    pub quiet_hours: Option<(String, String)>,
    /// Turn quiet hours off.
    #[arg(long)]
    pub no_quiet_hours: bool,
}

impl From<ConfigureArgs> for UpdatePreferencesRequest {
    fn from(args: ConfigureArgs) -> Self {
        Self {
            task_reminders: args.task_reminders,
            event_reminders: args.event_reminders,
            ai_suggestions: args.ai_suggestions,
            email_notifications: args.email,
            push_notifications: args.push,
            reminder_timing: args.remind_before,
            quiet_hours: if args.no_quiet_hours {
                Some(None)
            } else {
                args.quiet_hours.map(Some)
            },
        }
    }
}

fn parse_quiet_hours(s: &str) -> std::result::Result<(String, String), String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected HH:MM-HH:MM, got {s}"))?;
    Ok((start.trim().to_string(), end.trim().to_string()))
}

pub async fn run(
    command: NotificationsCommand,
    context: &AppContext,
    format: OutputFormat,
) -> Result<String> {
    let notifications = &context.notifications;

    let output = match command.action {
        NotificationsAction::List {
            unread,
            kind,
            priority,
        } => {
            let mut list = if unread {
                notifications.unread()
            } else {
                notifications.all()
            };
            if let Some(kind) = kind {
                list.retain(|n| n.kind == kind);
            }
            if let Some(priority) = priority {
                list.retain(|n| n.priority == priority);
            }
            render(&list, format, |l| pretty::format_notifications(l))
        }
        NotificationsAction::Count => {
            let count = notifications.unread_count();
            render(&count, format, |c| format!("{c} unread"))
        }
        NotificationsAction::Get { id } => {
            let notification = found(notifications.get(&id), &id)?;
            render(&notification, format, pretty::format_notification)
        }
        NotificationsAction::Read { id } => {
            notifications.mark_as_read(&id).await?;
            let notification = found(notifications.get(&id), &id)?;
            render(&notification, format, pretty::format_notification)
        }
        NotificationsAction::ReadAll => {
            notifications.mark_all_as_read().await?;
            "Marked all notifications as read".to_string()
        }
        NotificationsAction::Dismiss { id } => {
            notifications.dismiss(&id).await?;
            format!("Dismissed notification {id}")
        }
        NotificationsAction::Delete { id } => {
            notifications.remove(&id).await?;
            format!("Deleted notification {id}")
        }
        NotificationsAction::Check => {
            let created = context.scheduler().tick().await?;
            render(&created, format, |n| format!("Created {n} reminder(s)"))
        }
        NotificationsAction::Preferences => {
            let prefs = notifications.preferences();
            render(&prefs, format, pretty::format_preferences)
        }
        NotificationsAction::Configure(args) => {
            let prefs = notifications.update_preferences(args.into()).await?;
            render(&prefs, format, |p| format!("Updated:\n{}", pretty::format_preferences(p)))
        }
    };

    Ok(output)
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use chrono::Duration;

    use prodhub_core::notifications::Notification;
    use prodhub_core::tasks::Task;

    use crate::cli::test_support::signed_in_context;
    use crate::testing::ten_am;

    fn parse(args: &[&str]) -> NotificationsCommand {
        NotificationsCommand::try_parse_from(
            std::iter::once("notifications").chain(args.iter().copied()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_read_all_clears_unread() {
        let context = signed_in_context().await;
        for title in ["a", "b"] {
            context
                .notifications
                .add(Notification::new(NotificationKind::System, title, ""))
                .await
                .unwrap();
        }

        let before = run(parse(&["count"]), &context, OutputFormat::Pretty)
            .await
            .unwrap();
        assert_eq!(before, "2 unread");

        run(parse(&["read-all"]), &context, OutputFormat::Pretty)
            .await
            .unwrap();
        let after = run(parse(&["count"]), &context, OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(after, "0");

        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_configure_then_check() {
        let context = signed_in_context().await;
        context
            .tasks
            .add(Task::new("Pay rent").with_due_date(ten_am() + Duration::minutes(20)))
            .await
            .unwrap();

        run(
            parse(&["configure", "--no-quiet-hours", "--remind-before", "30"]),
            &context,
            OutputFormat::Pretty,
        )
        .await
        .unwrap();
        let output = run(parse(&["check"]), &context, OutputFormat::Pretty)
            .await
            .unwrap();

        assert_eq!(output, "Created 1 reminder(s)");
        assert_eq!(context.notifications.unread_count(), 1);
        context.shutdown().await;
    }

    #[test]
    fn test_quiet_hours_flag() {
        let cmd = parse(&["configure", "--quiet-hours", "22:00-07:00"]);
        let NotificationsAction::Configure(args) = cmd.action else {
            panic!("expected configure");
        };

        let request = UpdatePreferencesRequest::from(args);
        assert_eq!(
            request.quiet_hours,
            Some(Some(("22:00".to_string(), "07:00".to_string())))
        );
    }

    #[test]
    fn test_malformed_quiet_hours_rejected() {
        let result = NotificationsCommand::try_parse_from([
            "notifications", "configure", "--quiet-hours", "late",
        ]);
        assert!(result.is_err());
    }
}
