//! Journal CLI commands.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use prodhub_core::journal::{JournalEntry, Mood, UpdateJournalEntryRequest};

use super::{found, OutputFormat};
use crate::context::AppContext;
use crate::error::Result;
use crate::output::{pretty, render};

/// Journal commands.
#[derive(Debug, Parser)]
pub struct JournalCommand {
    #[command(subcommand)]
    pub action: JournalAction,
}

/// Available journal actions.
#[derive(Debug, Subcommand)]
pub enum JournalAction {
    /// List entries.
    List {
        /// Only entries written on this local day (YYYY-MM-DD).
        #[arg(long)]
        day: Option<NaiveDate>,
        #[arg(long, conflicts_with = "day")]
        mood: Option<Mood>,
    },
    /// Search titles, content and tags.
    Search {
        query: String,
    },
    /// Write a new entry.
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        mood: Option<Mood>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        private: bool,
    },
    /// Get entry by ID.
    Get {
        id: String,
    },
    /// Update an entry.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        mood: Option<Mood>,
        #[arg(long)]
        private: Option<bool>,
    },
    /// Delete entry by ID.
    Delete {
        id: String,
    },
}

pub async fn run(command: JournalCommand, context: &AppContext, format: OutputFormat) -> Result<String> {
    let journal = &context.journal;

    let output = match command.action {
        JournalAction::List { day, mood } => {
            let list = match (day, mood) {
                (Some(day), _) => journal.on_day(day),
                (None, Some(mood)) => journal.by_mood(mood),
                (None, None) => journal.all(),
            };
            render(&list, format, |l| pretty::format_journal_entries(l))
        }
        JournalAction::Search { query } => render(&journal.search(&query), format, |l| {
            pretty::format_journal_entries(l)
        }),
        JournalAction::Add {
            title,
            content,
            mood,
            tags,
            private,
        } => {
            let mut entry = JournalEntry::new(title, content).with_tags(tags);
            entry.mood = mood;
            entry.is_private = private;

            let id = journal.add(entry).await?;
            let entry = found(journal.get(&id), &id)?;
            render(&entry, format, |e| {
                format!("Created:\n{}", pretty::format_journal_entry(e))
            })
        }
        JournalAction::Get { id } => {
            let entry = found(journal.get(&id), &id)?;
            render(&entry, format, pretty::format_journal_entry)
        }
        JournalAction::Update {
            id,
            title,
            content,
            mood,
            private,
        } => {
            let request = UpdateJournalEntryRequest {
                title,
                content,
                mood,
                is_private: private,
                ..UpdateJournalEntryRequest::default()
            };
            journal.update(&id, &request).await?;
            let entry = found(journal.get(&id), &id)?;
            render(&entry, format, |e| {
                format!("Updated:\n{}", pretty::format_journal_entry(e))
            })
        }
        JournalAction::Delete { id } => {
            journal.remove(&id).await?;
            format!("Deleted journal entry {id}")
        }
    };

    Ok(output)
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use crate::cli::test_support::signed_in_context;

    fn parse(args: &[&str]) -> JournalCommand {
        JournalCommand::try_parse_from(std::iter::once("journal").chain(args.iter().copied()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_filter_by_mood() {
        let context = signed_in_context().await;

        run(
            parse(&["add", "Good day", "--mood", "happy"]),
            &context,
            OutputFormat::Pretty,
        )
        .await
        .unwrap();
        run(parse(&["add", "Meh", "--mood", "neutral"]), &context, OutputFormat::Pretty)
            .await
            .unwrap();

        let happy = run(parse(&["list", "--mood", "happy"]), &context, OutputFormat::Json)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&happy).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["mood"], "happy");

        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let context = signed_in_context().await;

        let err = run(parse(&["add", "  "]), &context, OutputFormat::Pretty)
            .await
            .unwrap_err();

        assert!(matches!(err, crate::error::CollectionError::Validation(_)));
        context.shutdown().await;
    }
}
