//! Document store backends.
//!
//! Concrete implementations of [`prodhub_core::storage::DocumentStore`],
//! each behind a feature flag. The backend actually used is chosen at
//! runtime from [`crate::config::Config`].
//!
//! # Feature Flags
//!
//! - `inmemory` (default): process-local store, lost on exit
//! - `sqlite` (default): SQLite store using `rusqlite` and `tokio-rusqlite`

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'sqlite' feature. \
    Example: cargo build -p prodhub --features sqlite"
);

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryDocumentStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDocumentStore;
