use thiserror::Error;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("User not authenticated")]
    NotAuthenticated,
    #[error("{collection} record not found: {id}")]
    RecordNotFound { collection: String, id: String },
    #[error("{collection} record already exists: {id}")]
    AlreadyExists { collection: String, id: String },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Network or backend failures that might succeed if attempted again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::QueryFailed(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authenticated_display() {
        assert_eq!(
            StoreError::NotAuthenticated.to_string(),
            "User not authenticated"
        );
    }

    #[test]
    fn test_not_found_display() {
        let error = StoreError::not_found("tasks", "abc-123");
        assert_eq!(error.to_string(), "tasks record not found: abc-123");
    }

    #[test]
    fn test_already_exists_display() {
        let error = StoreError::AlreadyExists {
            collection: "notes".to_string(),
            id: "n1".to_string(),
        };
        assert_eq!(error.to_string(), "notes record already exists: n1");
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::ConnectionFailed("timeout".into()).is_transient());
        assert!(StoreError::QueryFailed("locked".into()).is_transient());
        assert!(!StoreError::NotAuthenticated.is_transient());
        assert!(!StoreError::not_found("tasks", "x").is_transient());
        assert!(!StoreError::Serialization("bad".into()).is_transient());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::Serialization(_)));
    }
}
