//! Error types for collection services.

use prodhub_core::record::ValidationError;
use prodhub_core::storage::StoreError;
use thiserror::Error;

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Errors returned by every mutation of a cached collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl CollectionError {
    /// True when the failure came from a missing identity.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotAuthenticated))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::RecordNotFound { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_is_transparent() {
        let err = CollectionError::from(StoreError::not_found("notes", "n1"));
        assert_eq!(err.to_string(), "notes record not found: n1");
        assert!(err.is_not_found());
        assert!(!err.is_not_authenticated());
    }

    #[test]
    fn test_validation_error_message() {
        let err = CollectionError::from(ValidationError::EmptyTitle);
        assert_eq!(err.to_string(), "Validation failed: Title is required");
    }
}
