//! Room registry
//!
//! Maps room names to broadcast senders. A room exists while at least one
//! connection is subscribed; publishing into an empty room is a no-op and
//! drops the stale channel.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::realtime::events::ServerEvent;

pub struct RoomRegistry {
    buffer: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<ServerEvent>>>,
}

impl RoomRegistry {
    pub fn new(buffer: usize) -> Self {
        Self {
            buffer,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to a room, creating its channel on first use.
    pub async fn subscribe(&self, room: &str) -> broadcast::Receiver<ServerEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer).0)
            .subscribe()
    }

    /// Send an event to everyone in a room. Returns the number of
    /// subscribers reached; zero means the room was empty.
    pub async fn publish(&self, room: &str, event: ServerEvent) -> usize {
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(room) {
                Some(tx) => tx.send(event).unwrap_or(0),
                None => 0,
            }
        };

        if delivered == 0 {
            debug!("[Realtime] No subscribers in {}", room);
            let mut channels = self.channels.write().await;
            if channels
                .get(room)
                .is_some_and(|tx| tx.receiver_count() == 0)
            {
                channels.remove(room);
            }
        }

        delivered
    }

    /// Number of live rooms, for diagnostics.
    pub async fn room_count(&self) -> usize {
        self.channels.read().await.len()
    }
}
