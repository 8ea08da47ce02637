//! Presence and sharing for collaborative editing.
//!
//! Presence rides on a [`PresenceTransport`]: every client broadcasts its
//! own [`PresenceEvent`]s to a room and listens for everyone else's.

mod memory;
mod service;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use prodhub_core::sharing::PresenceEvent;

pub use memory::MemoryPresence;
pub use service::CollaborationService;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresenceError {
    #[error("Not in a presence room")]
    NotJoined,

    #[error("Presence transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, PresenceError>;

/// A channel that can broadcast presence to everyone in a room.
#[async_trait]
pub trait PresenceTransport: Send + Sync {
    /// Sends an event to every subscriber of `room`, including the sender.
    async fn broadcast(&self, room: &str, event: PresenceEvent) -> Result<()>;

    async fn subscribe(&self, room: &str) -> Result<broadcast::Receiver<PresenceEvent>>;
}
