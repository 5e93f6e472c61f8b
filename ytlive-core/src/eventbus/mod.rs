//! src/eventbus/mod.rs
//!
//! In-process fan-out of client events into per-user rooms. Each connected
//! client (one WebSocket) holds one bounded receiver; a user may have several.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};
use uuid::Uuid;

use ytlive_common::models::ClientEvent;
use ytlive_common::traits::api::NotificationSink;

/// Default size for each client's buffer.
const DEFAULT_BUFFER_SIZE: usize = 64;

/// Rooms are keyed by user id. Publishing never waits on a client: a full
/// buffer drops the event for that client, a closed one is pruned.
#[derive(Clone)]
pub struct UserEventBus {
    rooms: Arc<DashMap<Uuid, Vec<mpsc::Sender<ClientEvent>>>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    pub shutdown_rx: watch::Receiver<bool>,
}

impl Default for UserEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl UserEventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rooms: Arc::new(DashMap::new()),
            shutdown_tx: Arc::new(tx),
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Joins `user_id`'s room. Senders of connections that already went away
    /// are dropped on the way in.
    pub fn subscribe(&self, user_id: Uuid, buffer_size: Option<usize>) -> mpsc::Receiver<ClientEvent> {
        let (tx, rx) = mpsc::channel(buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE));
        let mut senders = self.rooms.entry(user_id).or_default();
        senders.retain(|s| !s.is_closed());
        senders.push(tx);
        rx
    }

    /// Called once a connection's receiver is dropped. Prunes closed senders
    /// and removes the room when nobody is left in it.
    pub fn leave(&self, user_id: Uuid) {
        if let Some(mut senders) = self.rooms.get_mut(&user_id) {
            senders.retain(|s| !s.is_closed());
        }
        self.rooms.remove_if(&user_id, |_, v| v.is_empty());
    }

    pub fn connection_count(&self, user_id: Uuid) -> usize {
        self.rooms
            .get(&user_id)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    /// Delivers to every live connection of `user_id`; returns how many got it.
    pub fn publish_to_user(&self, user_id: Uuid, event: &ClientEvent) -> usize {
        let Some(mut senders) = self.rooms.get_mut(&user_id) else {
            debug!("No connected clients for user {}", user_id);
            return 0;
        };

        let mut delivered = 0;
        senders.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Client buffer full for user {}; dropping {}", user_id, event.name());
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });

        let empty = senders.is_empty();
        drop(senders);
        if empty {
            self.rooms.remove_if(&user_id, |_, v| v.is_empty());
        }
        delivered
    }
}

#[async_trait]
impl NotificationSink for UserEventBus {
    async fn notify_user(&self, user_id: Uuid, event: &ClientEvent) -> usize {
        self.publish_to_user(user_id, event)
    }
}
