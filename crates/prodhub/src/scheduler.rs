//! Periodic reminder generation.
//!
//! Every tick looks at the cached tasks and events and creates a
//! notification for each one that has entered the reminder window. The
//! window, quiet hours and which kinds of reminders are enabled all come
//! from the user's notification preferences.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as TimeDelta;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use prodhub_core::clock::Clock;
use prodhub_core::notifications::{
    event_start_reminder, has_reminder, task_due_reminder, NotificationPreferences,
    ReminderWindow,
};

use crate::error::Result;
use crate::services::{CalendarService, NotificationService, TaskService};

/// Events are considered for reminders when they start within this window.
const EVENT_LOOKAHEAD_DAYS: i64 = 1;

/// Creates due-soon reminders on a fixed interval.
#[derive(Clone)]
pub struct ReminderScheduler {
    tasks: TaskService,
    events: CalendarService,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl ReminderScheduler {
    pub fn new(
        tasks: TaskService,
        events: CalendarService,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Self {
        Self {
            tasks,
            events,
            notifications,
            clock,
            period,
        }
    }

    fn window(prefs: &NotificationPreferences) -> ReminderWindow {
        ReminderWindow::from_preferences(prefs).unwrap_or_else(|error| {
            tracing::warn!(error = %error, "ignoring invalid quiet hours");
            ReminderWindow::new(TimeDelta::minutes(i64::from(prefs.reminder_timing)))
        })
    }

    /// Runs one pass and returns how many reminders were created.
    pub async fn tick(&self) -> Result<usize> {
        let prefs = self.notifications.preferences();
        let window = Self::window(&prefs);
        let now = self.clock.now();
        let hour = self.clock.local_hour();
        let mut created = 0;

        if prefs.task_reminders {
            for task in self.tasks.upcoming() {
                let Some(due) = task.due_date else { continue };
                if !window.is_eligible(due, now, hour) {
                    continue;
                }
                if self
                    .notifications
                    .collection()
                    .with_snapshot(|existing| has_reminder(existing, &task.id, due))
                {
                    continue;
                }
                self.notifications
                    .add(task_due_reminder(&task, due, prefs.reminder_timing))
                    .await?;
                created += 1;
            }
        }

        if prefs.event_reminders {
            for event in self.events.upcoming_within(EVENT_LOOKAHEAD_DAYS) {
                if !window.is_eligible(event.start, now, hour) {
                    continue;
                }
                if self
                    .notifications
                    .collection()
                    .with_snapshot(|existing| has_reminder(existing, &event.id, event.start))
                {
                    continue;
                }
                self.notifications
                    .add(event_start_reminder(&event, prefs.reminder_timing))
                    .await?;
                created += 1;
            }
        }

        if prefs.ai_suggestions {
            self.suggest().await;
        }

        if created > 0 {
            tracing::info!(created, "reminders created");
        }
        Ok(created)
    }

    /// Hook for AI generated suggestions. Nothing is generated yet.
    async fn suggest(&self) {
        tracing::trace!("no suggestion source configured");
    }

    /// Ticks every period until `shutdown` fires. The first tick happens
    /// one period after spawning.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            tracing::info!(period_secs = self.period.as_secs(), "reminder scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(error) = self.tick().await {
                            tracing::warn!(error = %error, "reminder tick failed");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
            tracing::info!("reminder scheduler stopped");
        })
    }
}
