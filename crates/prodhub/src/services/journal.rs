use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use prodhub_core::journal::{
    entries_by_mood, entries_in_range, entries_on_day, JournalEntry, Mood,
    UpdateJournalEntryRequest,
};
use prodhub_core::record::validate_title;
use prodhub_core::views;

use super::owned;
use crate::collection::CachedCollection;
use crate::error::Result;
use crate::gateway::RemoteStoreGateway;

/// Journal entries of the signed-in user.
#[derive(Clone)]
pub struct JournalService {
    entries: Arc<CachedCollection<JournalEntry>>,
}

impl JournalService {
    pub fn new(gateway: RemoteStoreGateway) -> Self {
        Self {
            entries: Arc::new(CachedCollection::new(gateway)),
        }
    }

    pub fn collection(&self) -> &Arc<CachedCollection<JournalEntry>> {
        &self.entries
    }

    pub fn bind(&self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        self.entries.bind(shutdown)
    }

    pub fn observe(&self) -> watch::Receiver<Vec<JournalEntry>> {
        self.entries.observe()
    }

    pub async fn reload(&self) {
        self.entries.reload().await
    }

    pub async fn add(&self, entry: JournalEntry) -> Result<String> {
        self.entries.add(entry).await
    }

    pub async fn update(&self, id: &str, request: &UpdateJournalEntryRequest) -> Result<()> {
        if let Some(title) = &request.title {
            validate_title(title)?;
        }
        self.entries.update(id, request).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.entries.remove(id).await
    }

    pub fn all(&self) -> Vec<JournalEntry> {
        self.entries.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<JournalEntry> {
        self.entries
            .with_snapshot(|entries| views::find_by_id(entries, id).cloned())
    }

    /// Entries created in `[start, end)`.
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<JournalEntry> {
        self.entries
            .with_snapshot(|entries| owned(entries_in_range(entries, start, end)))
    }

    pub fn by_mood(&self, mood: Mood) -> Vec<JournalEntry> {
        self.entries
            .with_snapshot(|entries| owned(entries_by_mood(entries, mood)))
    }

    /// Entries written on a local calendar day.
    pub fn on_day(&self, day: NaiveDate) -> Vec<JournalEntry> {
        self.entries
            .with_snapshot(|entries| owned(entries_on_day(entries, day, &Local)))
    }

    pub fn search(&self, query: &str) -> Vec<JournalEntry> {
        self.entries
            .with_snapshot(|entries| owned(views::search(entries, query)))
    }
}
