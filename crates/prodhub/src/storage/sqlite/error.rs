//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `StoreError` from
//! `prodhub_core::storage`. Specific errors are mapped to semantic variants
//! (e.g., PRIMARY KEY constraint to AlreadyExists).

use prodhub_core::storage::{CollectionPath, StoreError};

/// Maps a rusqlite error for a known document to a StoreError.
///
/// # Error Mapping
///
/// - `SQLITE_CONSTRAINT_PRIMARYKEY` / `SQLITE_CONSTRAINT_UNIQUE` → `StoreError::AlreadyExists`
/// - `QueryReturnedNoRows` → `StoreError::RecordNotFound`
/// - Cannot open → `StoreError::ConnectionFailed`
/// - All other errors → `StoreError::QueryFailed`
fn map_rusqlite_error(err: &rusqlite::Error, path: &CollectionPath, id: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::AlreadyExists {
                collection: path.collection.clone(),
                id: id.to_string(),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            StoreError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        rusqlite::Error::QueryReturnedNoRows => StoreError::not_found(&path.collection, id),

        _ => StoreError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a StoreError.
///
/// This is the main entry point for error mapping in async code.
/// `Other` errors carry document decoding failures raised inside a
/// connection closure.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    path: &CollectionPath,
    id: &str,
) -> StoreError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => map_rusqlite_error(rusqlite_err, path, id),
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            StoreError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        tokio_rusqlite::Error::Other(inner) => match inner.downcast_ref::<serde_json::Error>() {
            Some(json_err) => StoreError::Serialization(json_err.to_string()),
            None => StoreError::QueryFailed(err.to_string()),
        },
        _ => StoreError::QueryFailed(err.to_string()),
    }
}
