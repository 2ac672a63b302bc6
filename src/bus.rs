// Distribution bus: per-subscriber bounded buffers over a tokio broadcast
// channel. Publishing never waits on consumers; a subscriber that stops
// draining loses its oldest unread updates and nothing else.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::models::{DerivedState, Snapshot};

/// One cycle's published pair. Cheap to clone; both halves are shared.
#[derive(Debug, Clone)]
pub struct CycleUpdate {
    pub snapshot: Arc<Snapshot>,
    pub state: Arc<DerivedState>,
}

#[derive(Debug, Clone)]
pub struct Bus {
    tx: broadcast::Sender<CycleUpdate>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Writes to every subscriber's buffer without blocking. Returns false
    /// when no subscriber is registered.
    pub fn publish(&self, snapshot: Arc<Snapshot>, state: Arc<DerivedState>) -> bool {
        self.tx.send(CycleUpdate { snapshot, state }).is_ok()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A subscriber handle with its own bounded delivery queue. Dropping it
/// unsubscribes.
pub struct Subscription {
    rx: broadcast::Receiver<CycleUpdate>,
}

impl Subscription {
    /// Drains the queue and returns the most recent update, or None when
    /// nothing new arrived since the last call. Lag (dropped older items) is
    /// expected for slow consumers and skipped over silently.
    pub fn latest(&mut self) -> Option<CycleUpdate> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(update) => latest = Some(update),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::trace!(skipped, "subscriber lagged; resuming at oldest retained");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        latest
    }

    /// Waits for the next update. None once the producer has gone away.
    pub async fn next(&mut self) -> Option<CycleUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(update) => return Some(update),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::trace!(skipped, "subscriber lagged; resuming at oldest retained");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Updates currently buffered for this subscriber.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
