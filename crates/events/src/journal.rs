//! Bounded in-memory activity journal.
//!
//! [`ActivityJournal`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and keeps the most recent events for dashboard
//! activity feeds. It runs as a long-lived background task and shuts down
//! gracefully when the bus sender is dropped. Nothing is persisted.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::bus::PlatformEvent;

/// Default number of events retained.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 256;

pub struct ActivityJournal {
    entries: RwLock<VecDeque<PlatformEvent>>,
    capacity: usize,
}

impl ActivityJournal {
    /// Create a journal keeping at most `capacity` events (minimum 1).
    ///
    /// Storage grows on demand, so a large bound costs nothing up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Run the recording loop.
    ///
    /// Records every event received on `receiver`. The loop exits when the
    /// channel is closed (i.e. the [`EventBus`](crate::bus::EventBus) is
    /// dropped).
    pub async fn run(self: Arc<Self>, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        event_type = %event.event_type,
                        source_entity_id = ?event.source_entity_id,
                        "Recording activity"
                    );
                    self.record(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Activity journal lagged, some events were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, activity journal shutting down");
                    break;
                }
            }
        }
    }

    /// Append an event, evicting the oldest when full.
    pub async fn record(&self, event: PlatformEvent) {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(event);
    }

    /// Up to `limit` most recent events, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<PlatformEvent> {
        self.entries
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActivityJournal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_CAPACITY)
    }
}
