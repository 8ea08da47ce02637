//! The record contract shared by every cached collection.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Longest title accepted for any record.
pub const MAX_TITLE_LENGTH: usize = 200;

/// A record rejected before it reached the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Title cannot exceed {MAX_TITLE_LENGTH} characters")]
    TitleTooLong,

    #[error("End must not be before start")]
    InvalidTimeRange,

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),
}

/// Checks that a title is present and of reasonable length.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

/// A document that lives in a per-user collection of the remote store.
///
/// Implementations must serialize their identifier under `id` and their
/// timestamps under `createdAt` / `updatedAt`, since the gateway overwrites
/// those three fields on write.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the collection under `users/{id}/`.
    const COLLECTION: &'static str;

    /// Unique identifier within the collection.
    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Fixed ordering applied to every reloaded snapshot.
    ///
    /// The default keeps whatever order the store returned.
    fn sort_snapshot(_records: &mut [Self]) {}

    /// Rejects records that must never be written.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Records that participate in free-text search.
pub trait Searchable {
    fn title(&self) -> &str;

    /// Body text. Empty for records without one.
    fn body(&self) -> &str {
        ""
    }

    fn tags(&self) -> &[String] {
        &[]
    }
}

/// Generates a placeholder identifier for a record that has not been
/// written yet. The gateway replaces it with the server-generated one.
pub fn placeholder_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
