use std::sync::Arc;

use freelance_core::latency::Latency;
use freelance_core::CompletionService;
use freelance_events::{ActivityJournal, EventBus};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The job completion workflow and its registry.
    pub completions: Arc<CompletionService>,
    /// Centralized event bus for publishing workflow events.
    pub event_bus: Arc<EventBus>,
    /// Recent workflow activity, fed from the event bus.
    pub journal: Arc<ActivityJournal>,
}

impl AppState {
    /// Wire the seeded completion workflow, a fresh event bus, and an empty
    /// activity journal.
    ///
    /// The journal is only fed once its `run` loop is spawned on a
    /// subscription to `event_bus`.
    pub fn new(config: ServerConfig, latency: Arc<dyn Latency>) -> Self {
        let journal = Arc::new(ActivityJournal::new(config.journal_capacity));
        Self {
            config: Arc::new(config),
            completions: Arc::new(CompletionService::seeded(latency)),
            event_bus: Arc::new(EventBus::default()),
            journal,
        }
    }
}
