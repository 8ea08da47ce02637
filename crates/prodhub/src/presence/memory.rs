//! In-process presence transport.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use prodhub_core::sharing::PresenceEvent;

use super::{PresenceTransport, Result};

/// Channel capacity per room.
const CHANNEL_CAPACITY: usize = 100;

/// Presence over tokio broadcast channels, one per room.
#[derive(Debug, Clone, Default)]
pub struct MemoryPresence {
    rooms: Arc<RwLock<HashMap<String, broadcast::Sender<PresenceEvent>>>>,
}

impl MemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }

    async fn room(&self, room: &str) -> broadcast::Sender<PresenceEvent> {
        {
            let rooms = self.rooms.read().await;
            if let Some(sender) = rooms.get(room) {
                return sender.clone();
            }
        }

        let mut rooms = self.rooms.write().await;
        // Another caller may have created it in between.
        if let Some(sender) = rooms.get(room) {
            return sender.clone();
        }

        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        rooms.insert(room.to_string(), sender.clone());
        sender
    }

    /// Drops `room` once nobody listens to it anymore.
    async fn prune(&self, room: &str) {
        let mut rooms = self.rooms.write().await;
        if rooms.get(room).is_some_and(|sender| sender.receiver_count() == 0) {
            rooms.remove(room);
            tracing::debug!(room, "presence room closed");
        }
    }

    /// Number of rooms with a live channel.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[async_trait]
impl PresenceTransport for MemoryPresence {
    async fn broadcast(&self, room: &str, event: PresenceEvent) -> Result<()> {
        let leaving = matches!(event, PresenceEvent::Leave { .. });
        // No receivers just means nobody is in the room.
        let _ = self.room(room).await.send(event);
        if leaving {
            self.prune(room).await;
        }
        Ok(())
    }

    async fn subscribe(&self, room: &str) -> Result<broadcast::Receiver<PresenceEvent>> {
        Ok(self.room(room).await.subscribe())
    }
}
