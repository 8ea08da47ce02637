use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CollectionPath, Document, Result};

/// Raw document storage, namespaced by [`CollectionPath`].
///
/// Implementations hold no knowledge of identities or record types; the
/// gateway resolves the path and stamps documents before calling in.
/// `list` returns documents in insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Gets a single document.
    async fn get(&self, path: &CollectionPath, id: &str) -> Result<Option<Document>>;

    /// Lists every document in a collection.
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>>;

    /// Inserts a new document. Fails with `AlreadyExists` on a duplicate id.
    async fn insert(&self, path: &CollectionPath, id: &str, document: Document) -> Result<()>;

    /// Shallow-merges `patch` into an existing document and stamps
    /// `updatedAt` (see [`super::apply_patch`]). Fails with `RecordNotFound`.
    async fn merge(
        &self,
        path: &CollectionPath,
        id: &str,
        patch: Document,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Creates or replaces a document under a fixed id (see
    /// [`super::prepare_upsert`]).
    async fn upsert(
        &self,
        path: &CollectionPath,
        id: &str,
        document: Document,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Removes a document. Fails with `RecordNotFound`.
    async fn remove(&self, path: &CollectionPath, id: &str) -> Result<()>;
}
