use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use prodhub_core::notes::{Note, UpdateNoteRequest};
use prodhub_core::record::{validate_title, Record};
use prodhub_core::storage::StoreError;
use prodhub_core::views;

use super::owned;
use crate::collection::CachedCollection;
use crate::error::Result;
use crate::gateway::RemoteStoreGateway;

/// Notes of the signed-in user, pinned first and newest first.
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<CachedCollection<Note>>,
}

impl NoteService {
    pub fn new(gateway: RemoteStoreGateway) -> Self {
        Self {
            notes: Arc::new(CachedCollection::new(gateway)),
        }
    }

    pub fn collection(&self) -> &Arc<CachedCollection<Note>> {
        &self.notes
    }

    pub fn bind(&self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        self.notes.bind(shutdown)
    }

    pub fn observe(&self) -> watch::Receiver<Vec<Note>> {
        self.notes.observe()
    }

    pub async fn reload(&self) {
        self.notes.reload().await
    }

    fn ensure_cached(&self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(StoreError::not_found(Note::COLLECTION, id).into());
        }
        Ok(())
    }

    // ==================== Mutations ====================

    pub async fn add(&self, note: Note) -> Result<String> {
        self.notes.add(note).await
    }

    /// Updates a note known to the current snapshot.
    pub async fn update(&self, id: &str, request: &UpdateNoteRequest) -> Result<()> {
        self.ensure_cached(id)?;
        if let Some(title) = &request.title {
            validate_title(title)?;
        }
        self.notes.update(id, request).await
    }

    /// Removes a note known to the current snapshot.
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.ensure_cached(id)?;
        self.notes.remove(id).await
    }

    pub async fn toggle_pin(&self, id: &str) -> Result<()> {
        let pinned = self
            .get(id)
            .map(|note| note.is_pinned)
            .ok_or_else(|| StoreError::not_found(Note::COLLECTION, id))?;
        self.notes
            .update(id, &UpdateNoteRequest::new().with_pinned(!pinned))
            .await
    }

    pub async fn archive(&self, id: &str) -> Result<()> {
        self.update(id, &UpdateNoteRequest::new().with_archived(true))
            .await
    }

    // ==================== Views ====================

    pub fn all(&self) -> Vec<Note> {
        self.notes.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.notes.with_snapshot(|notes| views::find_by_id(notes, id).cloned())
    }

    pub fn search(&self, query: &str) -> Vec<Note> {
        self.notes.with_snapshot(|notes| owned(views::search(notes, query)))
    }

    pub fn with_tag(&self, tag: &str) -> Vec<Note> {
        self.notes.with_snapshot(|notes| owned(views::with_tag(notes, tag)))
    }
}
