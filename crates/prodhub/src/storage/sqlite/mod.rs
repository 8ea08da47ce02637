//! SQLite document store.
//!
//! Documents are kept as JSON text in a single table keyed by
//! `(namespace, collection, id)`, using `rusqlite` for synchronous
//! operations and `tokio-rusqlite` for async wrapping.

mod error;
mod schema;
mod store;

pub use store::SqliteDocumentStore;
