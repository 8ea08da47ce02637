//! Reactive cached collections for a personal productivity hub.
//!
//! Each collection keeps a replay-latest snapshot of the signed-in user's
//! records, reloads it after every write and clears it on sign-out. The
//! pure domain logic lives in `prodhub_core`; this crate is the async
//! shell around it.

pub mod cli;
pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod output;
pub mod presence;
pub mod scheduler;
pub mod services;
pub mod storage;

#[cfg(all(test, feature = "inmemory"))]
mod testing;

pub use context::AppContext;
pub use error::{CollectionError, Result};
