use crate::models::{ChatLine, PlayerStateSnapshot, PlaylistTrack};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::debug;

/// Updates published by a running room session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A fresh backend snapshot was applied to the local element
    PlayerStateChanged { snapshot: PlayerStateSnapshot },
    /// Displayed progress moved (live reading or corrected position)
    PositionChanged { position_ms: u64, duration_ms: u64 },
    PlaylistUpdated { tracks: Vec<PlaylistTrack> },
    ChatUpdated { lines: Vec<ChatLine> },
    /// A user-initiated command failed; message is display-ready
    Error { message: String },
}

type SubscriptionId = u64;

struct Subscription {
    tx: tokio_mpsc::UnboundedSender<SessionEvent>,
}

/// Handle for subscribing to session events.
///
/// Events are fanned out to every live subscriber; a subscription is
/// removed the first time a send fails because its receiver was dropped.
#[derive(Clone)]
pub struct SessionEvents {
    subscriptions: Arc<Mutex<HashMap<SubscriptionId, Subscription>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Subscribe to all session events. The subscription is dropped
    /// automatically once the receiver goes away.
    pub fn subscribe(&self) -> tokio_mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = tokio_mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        self.subscriptions
            .lock()
            .unwrap()
            .insert(id, Subscription { tx });
        rx
    }

    /// Deliver one event to every subscriber, pruning dead ones.
    pub fn publish(&self, event: SessionEvent) {
        let mut subs = self.subscriptions.lock().unwrap();
        let mut to_remove = Vec::new();

        for (id, subscription) in subs.iter() {
            if subscription.tx.send(event.clone()).is_err() {
                to_remove.push(*id);
            }
        }

        for id in to_remove {
            debug!("pruning dropped session subscriber {}", id);
            subs.remove(&id);
        }
    }
}
