//! Change notifications for the in-memory annotation list.
//!
//! A UI subscribes once and redraws whenever the pipeline reports that its
//! list changed. Delivery uses `tokio::sync::broadcast`; a receiver that
//! falls behind gets `Lagged` and should re-read the whole list.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What changed in the annotation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListEvent {
    /// The list was replaced by a full fetch.
    Reloaded { count: usize },
    /// A landmark was appended.
    Added { id: String },
    /// A landmark was replaced in place.
    Updated { id: String },
    /// A landmark was removed.
    Removed { id: String },
}

/// Broadcast channel for [`ListEvent`]s.
pub struct EventBus {
    tx: broadcast::Sender<ListEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Send an event to all subscribers. Dropped silently when nobody listens.
    pub fn emit(&self, event: ListEvent) {
        tracing::trace!(
            subsystem = "pipeline",
            component = "events",
            subscriber_count = self.tx.receiver_count(),
            ?event,
            "EventBus emit"
        );
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
