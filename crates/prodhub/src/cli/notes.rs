//! Note CLI commands.

use clap::{Parser, Subcommand};

use prodhub_core::notes::{Note, UpdateNoteRequest};

use super::{found, OutputFormat};
use crate::context::AppContext;
use crate::error::Result;
use crate::output::{pretty, render};

/// Note management commands.
#[derive(Debug, Parser)]
pub struct NotesCommand {
    #[command(subcommand)]
    pub action: NotesAction,
}

/// Available note actions.
#[derive(Debug, Subcommand)]
pub enum NotesAction {
    /// List notes, pinned first.
    List {
        #[arg(long)]
        tag: Option<String>,
    },
    /// Search titles, content and tags.
    Search {
        query: String,
    },
    /// Create a new note.
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        pinned: bool,
    },
    /// Get note by ID.
    Get {
        id: String,
    },
    /// Update a note.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },
    /// Pin or unpin a note.
    Pin {
        id: String,
    },
    /// Archive a note.
    Archive {
        id: String,
    },
    /// Delete note by ID.
    Delete {
        id: String,
    },
}

pub async fn run(command: NotesCommand, context: &AppContext, format: OutputFormat) -> Result<String> {
    let notes = &context.notes;

    let output = match command.action {
        NotesAction::List { tag } => {
            let list = match tag {
                Some(tag) => notes.with_tag(&tag),
                None => notes.all(),
            };
            render(&list, format, |l| pretty::format_notes(l))
        }
        NotesAction::Search { query } => {
            render(&notes.search(&query), format, |l| pretty::format_notes(l))
        }
        NotesAction::Add {
            title,
            content,
            tags,
            pinned,
        } => {
            let mut note = Note::new(title, content).with_tags(tags);
            if pinned {
                note = note.pinned();
            }
            let id = notes.add(note).await?;
            let note = found(notes.get(&id), &id)?;
            render(&note, format, |n| format!("Created:\n{}", pretty::format_note(n)))
        }
        NotesAction::Get { id } => {
            let note = found(notes.get(&id), &id)?;
            render(&note, format, pretty::format_note)
        }
        NotesAction::Update {
            id,
            title,
            content,
            tags,
        } => {
            let request = UpdateNoteRequest {
                title,
                content,
                tags,
                ..UpdateNoteRequest::default()
            };
            notes.update(&id, &request).await?;
            let note = found(notes.get(&id), &id)?;
            render(&note, format, |n| format!("Updated:\n{}", pretty::format_note(n)))
        }
        NotesAction::Pin { id } => {
            notes.toggle_pin(&id).await?;
            let note = found(notes.get(&id), &id)?;
            render(&note, format, pretty::format_note)
        }
        NotesAction::Archive { id } => {
            notes.archive(&id).await?;
            format!("Archived note {id}")
        }
        NotesAction::Delete { id } => {
            notes.remove(&id).await?;
            format!("Deleted note {id}")
        }
    };

    Ok(output)
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use crate::cli::test_support::signed_in_context;

    fn parse(args: &[&str]) -> NotesCommand {
        NotesCommand::try_parse_from(std::iter::once("notes").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn test_add_and_search() {
        let context = signed_in_context().await;

        run(
            parse(&["add", "Groceries", "--content", "eggs and flour", "--tags", "home"]),
            &context,
            OutputFormat::Pretty,
        )
        .await
        .unwrap();

        let hits = run(parse(&["search", "flour"]), &context, OutputFormat::Pretty)
            .await
            .unwrap();
        assert!(hits.starts_with("NOTES (1)"));
        assert!(hits.contains("Groceries"));

        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_pin_marks_note() {
        let context = signed_in_context().await;
        let id = context.notes.add(Note::new("Idea", "")).await.unwrap();

        let output = run(parse(&["pin", &id]), &context, OutputFormat::Pretty)
            .await
            .unwrap();

        assert!(output.starts_with("Idea *"));
        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_update_unknown_note_fails() {
        let context = signed_in_context().await;

        let err = run(parse(&["update", "ghost", "--title", "x"]), &context, OutputFormat::Json)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        context.shutdown().await;
    }
}
