//! Simulated latency boundary for workflow operations.
//!
//! Every service call awaits [`Latency::wait`] before touching the store, so
//! a cancelled wait never leaves a partial write behind.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// Delay applied to submit, approve, and reject.
pub const MUTATION_DELAY_MS: u64 = 1_000;

/// Delay applied to list queries.
pub const LIST_DELAY_MS: u64 = 500;

/// Delay applied to single-record lookups.
pub const LOOKUP_DELAY_MS: u64 = 300;

/// The kind of operation a delay is being applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Submit,
    Approve,
    Reject,
    List,
    Lookup,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::List => "list",
            Self::Lookup => "lookup",
        }
    }
}

#[async_trait]
pub trait Latency: Send + Sync {
    /// Wait before performing `op`. Returns `CoreError::Cancelled` if the
    /// wait was interrupted.
    async fn wait(&self, op: Operation) -> Result<(), CoreError>;
}

/// Completes immediately. Used in tests and when simulation is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn wait(&self, _op: Operation) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Sleeps for a fixed per-operation duration, aborting early on cancellation.
#[derive(Debug, Clone)]
pub struct FixedLatency {
    mutation: Duration,
    list: Duration,
    lookup: Duration,
    cancel: CancellationToken,
}

impl FixedLatency {
    pub fn new(mutation: Duration, list: Duration, lookup: Duration) -> Self {
        Self {
            mutation,
            list,
            lookup,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort in-flight and future waits when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn duration_for(&self, op: Operation) -> Duration {
        match op {
            Operation::Submit | Operation::Approve | Operation::Reject => self.mutation,
            Operation::List => self.list,
            Operation::Lookup => self.lookup,
        }
    }
}

impl Default for FixedLatency {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(MUTATION_DELAY_MS),
            Duration::from_millis(LIST_DELAY_MS),
            Duration::from_millis(LOOKUP_DELAY_MS),
        )
    }
}

#[async_trait]
impl Latency for FixedLatency {
    async fn wait(&self, op: Operation) -> Result<(), CoreError> {
        let delay = self.duration_for(op);
        tokio::select! {
            () = self.cancel.cancelled() => {
                tracing::debug!(op = op.as_str(), "Simulated latency cancelled");
                Err(CoreError::Cancelled)
            }
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
