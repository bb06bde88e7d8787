//! Completion workflow event bus and activity journal.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`ActivityJournal`]: bounded in-memory record of recent events, fed by
//!   a background task subscribed to the bus.

pub mod bus;
pub mod journal;

pub use bus::{EventBus, PlatformEvent};
pub use journal::ActivityJournal;
