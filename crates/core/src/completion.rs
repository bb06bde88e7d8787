//! Job completion records, status transitions, and input validation.
//!
//! A freelancer submits a completion for a job; the job's client later
//! approves or rejects it. Each record moves through a one-shot state
//! machine:
//!
//! ```text
//! pending --approve--> approved   (terminal)
//! pending --reject-->  rejected   (terminal)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CompletionId, JobId, Timestamp};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Feedback stored on an approval when the client leaves the notes blank.
pub const DEFAULT_APPROVAL_FEEDBACK: &str = "Job completed successfully";

/// Prefix of every generated completion id.
pub const COMPLETION_ID_PREFIX: &str = "completion_";

/// Entity name used in `CoreError::NotFound`.
pub const COMPLETION_ENTITY: &str = "Completion";

/* --------------------------------------------------------------------------
Status
-------------------------------------------------------------------------- */

/// Lifecycle state of a completion record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Pending,
    Approved,
    Rejected,
}

impl CompletionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Approved and rejected records accept no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --------------------------------------------------------------------------
Record
-------------------------------------------------------------------------- */

/// A freelancer's claim that a job is done, awaiting the client's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: CompletionId,
    pub job_id: JobId,
    pub notes: String,
    pub deliverables: Vec<String>,
    pub submitted_at: Timestamp,
    pub status: CompletionStatus,
    pub feedback: Option<String>,
    pub decided_at: Option<Timestamp>,
}

impl CompletionRecord {
    /// Build a fresh `pending` record with a newly generated id.
    ///
    /// Inputs are expected to have passed [`validate_notes`] and
    /// [`normalize_deliverables`] already.
    pub fn new_pending(job_id: JobId, notes: String, deliverables: Vec<String>) -> Self {
        Self {
            id: generate_completion_id(),
            job_id,
            notes,
            deliverables,
            submitted_at: chrono::Utc::now(),
            status: CompletionStatus::Pending,
            feedback: None,
            decided_at: None,
        }
    }

    /// Fail with `Conflict` unless the record is still awaiting a decision.
    pub fn ensure_pending(&self) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Completion '{}' has already been {}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// Transition `pending -> approved`.
    ///
    /// Blank notes are replaced by [`DEFAULT_APPROVAL_FEEDBACK`].
    pub fn approve(&mut self, notes: &str, now: Timestamp) -> Result<(), CoreError> {
        self.ensure_pending()?;
        let notes = notes.trim();
        let feedback = if notes.is_empty() {
            DEFAULT_APPROVAL_FEEDBACK
        } else {
            notes
        };
        self.status = CompletionStatus::Approved;
        self.feedback = Some(feedback.to_string());
        self.decided_at = Some(now);
        Ok(())
    }

    /// Transition `pending -> rejected`.
    ///
    /// The rejection reason is validated by the caller and is not part of
    /// the record; only the optional longer feedback is kept.
    pub fn reject(&mut self, feedback: &str, now: Timestamp) -> Result<(), CoreError> {
        self.ensure_pending()?;
        let feedback = feedback.trim();
        self.status = CompletionStatus::Rejected;
        self.feedback = (!feedback.is_empty()).then(|| feedback.to_string());
        self.decided_at = Some(now);
        Ok(())
    }
}

/// Generate a unique, time-ordered completion id.
pub fn generate_completion_id() -> CompletionId {
    format!("{COMPLETION_ID_PREFIX}{}", uuid::Uuid::now_v7().simple())
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that completion notes contain something besides whitespace.
pub fn validate_notes(notes: &str) -> Result<(), CoreError> {
    if notes.trim().is_empty() {
        return Err(CoreError::Validation(
            "Completion notes must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Drop blank deliverables, keeping the order of the rest.
///
/// Fails when nothing is left: a completion needs at least one deliverable.
pub fn normalize_deliverables(deliverables: Vec<String>) -> Result<Vec<String>, CoreError> {
    let kept: Vec<String> = deliverables
        .into_iter()
        .filter(|d| !d.trim().is_empty())
        .collect();

    if kept.is_empty() {
        return Err(CoreError::Validation(
            "At least one non-empty deliverable is required".to_string(),
        ));
    }
    Ok(kept)
}

/// Validate that a rejection carries a reason.
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A rejection reason is required".to_string(),
        ));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
