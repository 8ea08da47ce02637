//! Task CLI commands.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use prodhub_core::tasks::{Priority, Task, TaskFilter, UpdateTaskRequest};

use super::{found, OutputFormat};
use crate::context::AppContext;
use crate::error::Result;
use crate::output::{pretty, render};

/// Task management commands.
#[derive(Debug, Parser)]
pub struct TasksCommand {
    #[command(subcommand)]
    pub action: TasksAction,
}

/// Available task actions.
#[derive(Debug, Subcommand)]
pub enum TasksAction {
    /// List tasks.
    List {
        /// all, active or completed.
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
        /// Only tasks carrying this tag.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Open tasks due within the next 24 hours.
    Upcoming,
    /// Search titles, descriptions and tags.
    Search {
        query: String,
    },
    /// Create a new task.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due time (RFC 3339).
        #[arg(long)]
        due: Option<DateTime<Utc>>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Comma-separated tags.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Get task by ID.
    Get {
        id: String,
    },
    /// Update a task.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<DateTime<Utc>>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Toggle completion status.
    Toggle {
        id: String,
    },
    /// Archive a task.
    Archive {
        id: String,
    },
    /// Delete task by ID.
    Delete {
        id: String,
    },
    /// Assign display order from the given sequence of IDs.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub async fn run(command: TasksCommand, context: &AppContext, format: OutputFormat) -> Result<String> {
    let tasks = &context.tasks;

    let output = match command.action {
        TasksAction::List { filter, tag } => {
            let mut list = tasks.filtered(filter);
            if let Some(tag) = tag {
                list.retain(|task| task.tags.contains(&tag));
            }
            render(&list, format, |l| pretty::format_tasks(l))
        }
        TasksAction::Upcoming => render(&tasks.upcoming(), format, |l| pretty::format_tasks(l)),
        TasksAction::Search { query } => {
            render(&tasks.search(&query), format, |l| pretty::format_tasks(l))
        }
        TasksAction::Add {
            title,
            description,
            due,
            priority,
            tags,
        } => {
            let mut task = Task::new(title).with_priority(priority).with_tags(tags);
            task.description = description;
            task.due_date = due;

            let id = tasks.add(task).await?;
            let task = found(tasks.get(&id), &id)?;
            render(&task, format, |t| format!("Created:\n{}", pretty::format_task(t)))
        }
        TasksAction::Get { id } => {
            let task = found(tasks.get(&id), &id)?;
            render(&task, format, pretty::format_task)
        }
        TasksAction::Update {
            id,
            title,
            description,
            due,
            clear_due,
            priority,
            tags,
            completed,
        } => {
            let request = UpdateTaskRequest {
                title,
                description,
                completed,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
                priority,
                tags,
                ..UpdateTaskRequest::default()
            };
            tasks.update(&id, &request).await?;
            let task = found(tasks.get(&id), &id)?;
            render(&task, format, |t| format!("Updated:\n{}", pretty::format_task(t)))
        }
        TasksAction::Toggle { id } => {
            tasks.toggle_completed(&id).await?;
            let task = found(tasks.get(&id), &id)?;
            render(&task, format, pretty::format_task)
        }
        TasksAction::Archive { id } => {
            tasks.archive(&id).await?;
            format!("Archived task {id}")
        }
        TasksAction::Delete { id } => {
            tasks.remove(&id).await?;
            format!("Deleted task {id}")
        }
        TasksAction::Reorder { ids } => {
            tasks.reorder(&ids).await?;
            render(&tasks.all(), format, |l| pretty::format_tasks(l))
        }
    };

    Ok(output)
}
