//! Calendar event CLI commands.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use prodhub_core::calendar::{CalendarEvent, UpdateEventRequest};

use super::{found, OutputFormat};
use crate::context::AppContext;
use crate::error::Result;
use crate::output::{pretty, render};

/// Calendar event commands.
#[derive(Debug, Parser)]
pub struct EventsCommand {
    #[command(subcommand)]
    pub action: EventsAction,
}

/// Available event actions.
#[derive(Debug, Subcommand)]
pub enum EventsAction {
    /// List events by start time.
    List {
        /// Start of range (RFC 3339); events must lie fully inside.
        #[arg(long, requires = "until")]
        from: Option<DateTime<Utc>>,
        /// End of range (RFC 3339).
        #[arg(long, requires = "from")]
        until: Option<DateTime<Utc>>,
    },
    /// Events starting within the next few days.
    Upcoming {
        /// Look-ahead in days (defaults to UPCOMING_EVENT_DAYS).
        #[arg(long)]
        days: Option<i64>,
    },
    /// Events overlapping a local day (YYYY-MM-DD).
    Day {
        day: NaiveDate,
    },
    /// Events starting within seven days of the given time.
    Week {
        start: DateTime<Utc>,
    },
    /// Create a new event.
    Add {
        title: String,
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        all_day: bool,
        #[arg(long)]
        color: Option<String>,
    },
    /// Get event by ID.
    Get {
        id: String,
    },
    /// Update an event.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        all_day: Option<bool>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete event by ID.
    Delete {
        id: String,
    },
}

pub async fn run(command: EventsCommand, context: &AppContext, format: OutputFormat) -> Result<String> {
    let calendar = &context.calendar;
    let list = |events: Vec<CalendarEvent>| render(&events, format, |l| pretty::format_events(l));

    let output = match command.action {
        EventsAction::List { from, until } => match from.zip(until) {
            Some((from, until)) => list(calendar.in_range(from, until)),
            None => list(calendar.all()),
        },
        EventsAction::Upcoming { days } => match days {
            Some(days) => list(calendar.upcoming_within(days)),
            None => list(calendar.upcoming()),
        },
        EventsAction::Day { day } => list(calendar.for_day(day)),
        EventsAction::Week { start } => list(calendar.for_week(start)),
        EventsAction::Add {
            title,
            start,
            end,
            description,
            location,
            all_day,
            color,
        } => {
            let mut event = CalendarEvent::new(title, start, end);
            event.description = description;
            event.location = location;
            event.all_day = all_day;
            event.color = color;

            let id = calendar.add(event).await?;
            let event = found(calendar.get(&id), &id)?;
            render(&event, format, |e| format!("Created:\n{}", pretty::format_event(e)))
        }
        EventsAction::Get { id } => {
            let event = found(calendar.get(&id), &id)?;
            render(&event, format, pretty::format_event)
        }
        EventsAction::Update {
            id,
            title,
            start,
            end,
            description,
            location,
            all_day,
            color,
        } => {
            let request = UpdateEventRequest {
                title,
                start,
                end,
                description,
                location,
                all_day,
                color,
                ..UpdateEventRequest::default()
            };
            calendar.update(&id, &request).await?;
            let event = found(calendar.get(&id), &id)?;
            render(&event, format, |e| format!("Updated:\n{}", pretty::format_event(e)))
        }
        EventsAction::Delete { id } => {
            calendar.remove(&id).await?;
            format!("Deleted event {id}")
        }
    };

    Ok(output)
}
