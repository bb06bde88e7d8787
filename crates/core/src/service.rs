//! Job completion workflow: submission, client review, and queries.
//!
//! [`CompletionService`] is the single entry point used by the HTTP layer.
//! It owns no global state; the store, credential resolver, job directory,
//! and latency boundary are all injected by the composition root.

use std::sync::Arc;

use crate::completion::{
    normalize_deliverables, validate_notes, validate_rejection_reason, CompletionRecord,
    CompletionStatus, COMPLETION_ENTITY,
};
use crate::credentials::{
    authenticate, ClientDirectory, ClientProfile, CredentialPair, CredentialResolver,
    JobClientMap, StaticCredentials,
};
use crate::error::CoreError;
use crate::latency::{Latency, Operation};
use crate::store::CompletionStore;
use crate::types::{ClientId, CompletionId, JobId};

/* --------------------------------------------------------------------------
Inputs
-------------------------------------------------------------------------- */

/// A freelancer's request to mark a job as done.
#[derive(Debug, Clone)]
pub struct CompletionSubmission {
    pub job_id: JobId,
    pub notes: String,
    pub deliverables: Vec<String>,
    pub credentials: CredentialPair,
}

/// A client's approval of a pending completion.
#[derive(Debug, Clone)]
pub struct ApprovalDecision {
    pub completion_id: CompletionId,
    pub credentials: CredentialPair,
    pub notes: String,
}

/// A client's rejection of a pending completion.
#[derive(Debug, Clone)]
pub struct RejectionDecision {
    pub completion_id: CompletionId,
    pub credentials: CredentialPair,
    pub reason: String,
    pub feedback: String,
}

/* --------------------------------------------------------------------------
Service
-------------------------------------------------------------------------- */

pub struct CompletionService {
    store: Arc<CompletionStore>,
    credentials: Arc<dyn CredentialResolver>,
    directory: Arc<dyn ClientDirectory>,
    latency: Arc<dyn Latency>,
}

impl CompletionService {
    pub fn new(
        store: Arc<CompletionStore>,
        credentials: Arc<dyn CredentialResolver>,
        directory: Arc<dyn ClientDirectory>,
        latency: Arc<dyn Latency>,
    ) -> Self {
        Self {
            store,
            credentials,
            directory,
            latency,
        }
    }

    /// Empty store with the demo clients and job listings.
    pub fn seeded(latency: Arc<dyn Latency>) -> Self {
        Self::new(
            Arc::new(CompletionStore::new()),
            Arc::new(StaticCredentials::seeded()),
            Arc::new(JobClientMap::seeded()),
            latency,
        )
    }

    /// The client who owns `job_id` and must authorize its completions.
    pub fn client_for_job(&self, job_id: &str) -> ClientId {
        self.directory.client_for_job(job_id)
    }

    /// Record a new `pending` completion for a job.
    ///
    /// Blank deliverables are dropped. The presented credentials must match
    /// the job's client exactly.
    pub async fn submit(
        &self,
        submission: CompletionSubmission,
    ) -> Result<CompletionRecord, CoreError> {
        let CompletionSubmission {
            job_id,
            notes,
            deliverables,
            credentials,
        } = submission;

        validate_notes(&notes)?;
        let deliverables = normalize_deliverables(deliverables)?;

        let client_id = self.client_for_job(&job_id);
        self.authenticate(&client_id, &credentials).await?;

        self.latency.wait(Operation::Submit).await?;

        let record = CompletionRecord::new_pending(job_id, notes, deliverables);
        self.store.insert(record.clone()).await;

        tracing::info!(
            completion_id = %record.id,
            job_id = %record.job_id,
            client_id = %client_id,
            deliverables = record.deliverables.len(),
            "Completion submitted"
        );

        Ok(record)
    }

    /// Move a pending completion to `approved`.
    pub async fn approve(&self, decision: ApprovalDecision) -> Result<CompletionRecord, CoreError> {
        let job_id = self.pending_job_of(&decision.completion_id).await?;
        let client_id = self.client_for_job(&job_id);
        self.authenticate(&client_id, &decision.credentials).await?;

        self.latency.wait(Operation::Approve).await?;

        let record = self
            .store
            .update(&decision.completion_id, |r| {
                r.approve(&decision.notes, chrono::Utc::now())
            })
            .await?;

        tracing::info!(
            completion_id = %record.id,
            job_id = %record.job_id,
            client_id = %client_id,
            status = %record.status,
            "Completion approved"
        );

        Ok(record)
    }

    /// Move a pending completion to `rejected`.
    ///
    /// `reason` must be present but is only logged; the record keeps the
    /// optional `feedback`.
    pub async fn reject(&self, decision: RejectionDecision) -> Result<CompletionRecord, CoreError> {
        let job_id = self.pending_job_of(&decision.completion_id).await?;
        validate_rejection_reason(&decision.reason)?;
        let client_id = self.client_for_job(&job_id);
        self.authenticate(&client_id, &decision.credentials).await?;

        self.latency.wait(Operation::Reject).await?;

        let record = self
            .store
            .update(&decision.completion_id, |r| {
                r.reject(&decision.feedback, chrono::Utc::now())
            })
            .await?;

        tracing::info!(
            completion_id = %record.id,
            job_id = %record.job_id,
            client_id = %client_id,
            reason = %decision.reason.trim(),
            status = %record.status,
            "Completion rejected"
        );

        Ok(record)
    }

    /// Look up a single completion.
    pub async fn get(&self, completion_id: &str) -> Result<Option<CompletionRecord>, CoreError> {
        self.latency.wait(Operation::Lookup).await?;
        Ok(self.store.get(completion_id).await)
    }

    /// All completions for a job, newest first.
    pub async fn list_by_job(&self, job_id: &str) -> Result<Vec<CompletionRecord>, CoreError> {
        self.latency.wait(Operation::List).await?;
        Ok(self.store.list_by_job(job_id).await)
    }

    /// Pending completions awaiting `client_id`'s decision, newest first.
    pub async fn list_pending_by_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<CompletionRecord>, CoreError> {
        self.latency.wait(Operation::List).await?;
        Ok(self
            .store
            .list_where(|r| {
                r.status == CompletionStatus::Pending
                    && self.directory.client_for_job(&r.job_id) == client_id
            })
            .await)
    }

    /// Check a credential pair without touching any record.
    ///
    /// Unknown clients simply fail the check.
    pub async fn validate_client_credentials(
        &self,
        client_id: &str,
        password: &str,
        signature: &str,
    ) -> bool {
        match self.credentials.resolve(client_id).await {
            Some(expected) => expected.matches(password, signature),
            None => false,
        }
    }

    /// Public profile for a client, without secrets.
    pub async fn client_info(&self, client_id: &str) -> Option<ClientProfile> {
        self.credentials.profile(client_id).await
    }

    async fn authenticate(
        &self,
        client_id: &str,
        credentials: &CredentialPair,
    ) -> Result<(), CoreError> {
        let result = authenticate(
            self.credentials.as_ref(),
            client_id,
            &credentials.password,
            &credentials.signature,
        )
        .await;

        if let Err(e) = &result {
            tracing::warn!(client_id = %client_id, error = %e, "Client authentication failed");
        }
        result
    }

    /// Job id of a completion that is still awaiting a decision.
    async fn pending_job_of(&self, completion_id: &str) -> Result<JobId, CoreError> {
        let record = self
            .store
            .get(completion_id)
            .await
            .ok_or_else(|| CoreError::NotFound {
                entity: COMPLETION_ENTITY,
                id: completion_id.to_string(),
            })?;
        record.ensure_pending()?;
        Ok(record.job_id)
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::completion::DEFAULT_APPROVAL_FEEDBACK;
    use crate::latency::{FixedLatency, NoLatency};

    const PASSWORD: &str = "securePassword123";
    const SIGNATURE: &str = "client123_signature_2024";

    fn service() -> CompletionService {
        CompletionService::seeded(Arc::new(NoLatency))
    }

    fn creds() -> CredentialPair {
        CredentialPair::new(PASSWORD, SIGNATURE)
    }

    fn submission(job_id: &str) -> CompletionSubmission {
        CompletionSubmission {
            job_id: job_id.to_string(),
            notes: "done".to_string(),
            deliverables: vec!["file.zip".to_string()],
            credentials: creds(),
        }
    }

    fn approval(id: &str, notes: &str) -> ApprovalDecision {
        ApprovalDecision {
            completion_id: id.to_string(),
            credentials: creds(),
            notes: notes.to_string(),
        }
    }

    fn rejection(id: &str) -> RejectionDecision {
        RejectionDecision {
            completion_id: id.to_string(),
            credentials: creds(),
            reason: "missing source files".to_string(),
            feedback: "please include the PSDs".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_approve_then_reject_conflicts() {
        let svc = service();

        let record = svc.submit(submission("job1")).await.unwrap();
        assert_eq!(record.status, CompletionStatus::Pending);

        let approved = svc.approve(approval(&record.id, "")).await.unwrap();
        assert_eq!(approved.status, CompletionStatus::Approved);
        assert_eq!(approved.feedback.as_deref(), Some(DEFAULT_APPROVAL_FEEDBACK));
        assert!(approved.decided_at.is_some());

        let result = svc.reject(rejection(&record.id)).await;
        assert_matches!(result, Err(CoreError::Conflict(_)));

        let stored = svc.get(&record.id).await.unwrap().unwrap();
        assert_eq!(stored, approved);
    }

    #[tokio::test]
    async fn test_submit_drops_blank_deliverables() {
        let svc = service();
        let mut sub = submission("job1");
        sub.deliverables = vec!["a.zip".into(), "   ".into(), "".into(), "b.pdf".into()];

        let record = svc.submit(sub).await.unwrap();
        assert_eq!(record.deliverables, vec!["a.zip".to_string(), "b.pdf".to_string()]);
        assert!(record.deliverables.iter().all(|d| !d.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_submit_with_blank_notes_fails_validation() {
        let svc = service();
        let mut sub = submission("job1");
        sub.notes = "  ".into();

        assert_matches!(svc.submit(sub).await, Err(CoreError::Validation(_)));
        assert!(svc.list_by_job("job1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_deliverables_fails_validation() {
        let svc = service();
        let mut sub = submission("job1");
        sub.deliverables = vec![" ".into()];

        assert_matches!(svc.submit(sub).await, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_or_signature_appends_nothing() {
        let svc = service();

        let mut bad_password = submission("job1");
        bad_password.credentials = CredentialPair::new("wrong", SIGNATURE);
        let mut bad_signature = submission("job1");
        bad_signature.credentials = CredentialPair::new(PASSWORD, "wrong");

        let e1 = svc.submit(bad_password).await.unwrap_err();
        let e2 = svc.submit(bad_signature).await.unwrap_err();

        assert_matches!(e1, CoreError::Unauthorized(_));
        assert_matches!(e2, CoreError::Unauthorized(_));
        assert_eq!(e1.to_string(), e2.to_string());
        assert!(svc.list_by_job("job1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_credentials_are_checked_against_the_jobs_client() {
        let svc = service();
        // job2 belongs to client456; client123's pair must not work.
        assert_matches!(
            svc.submit(submission("job2")).await,
            Err(CoreError::Unauthorized(_))
        );

        let mut sub = submission("job2");
        sub.credentials = CredentialPair::new("anotherSecurePass456", "client456_signature_2024");
        assert!(svc.submit(sub).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_client_mapping_is_not_found() {
        let svc = CompletionService::new(
            Arc::new(CompletionStore::new()),
            Arc::new(StaticCredentials::seeded()),
            Arc::new(JobClientMap::new("client999")),
            Arc::new(NoLatency),
        );

        assert_matches!(
            svc.submit(submission("job1")).await,
            Err(CoreError::NotFound { entity: "Client", .. })
        );
    }

    #[tokio::test]
    async fn test_approve_unknown_completion_is_not_found() {
        let svc = service();
        assert_matches!(
            svc.approve(approval("completion_missing", "")).await,
            Err(CoreError::NotFound { entity: "Completion", .. })
        );
    }

    #[tokio::test]
    async fn test_approve_with_wrong_signature_leaves_record_pending() {
        let svc = service();
        let record = svc.submit(submission("job1")).await.unwrap();

        let mut decision = approval(&record.id, "nice");
        decision.credentials = CredentialPair::new(PASSWORD, "forged");

        assert_matches!(svc.approve(decision).await, Err(CoreError::Unauthorized(_)));
        let stored = svc.get(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CompletionStatus::Pending);
        assert!(stored.decided_at.is_none());
    }

    #[tokio::test]
    async fn test_reject_stores_feedback_not_reason() {
        let svc = service();
        let record = svc.submit(submission("job1")).await.unwrap();

        let rejected = svc.reject(rejection(&record.id)).await.unwrap();
        assert_eq!(rejected.status, CompletionStatus::Rejected);
        assert_eq!(rejected.feedback.as_deref(), Some("please include the PSDs"));
        assert!(rejected.decided_at.is_some());
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let svc = service();
        let record = svc.submit(submission("job1")).await.unwrap();

        let mut decision = rejection(&record.id);
        decision.reason = "   ".into();
        assert_matches!(svc.reject(decision).await, Err(CoreError::Validation(_)));

        let stored = svc.get(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CompletionStatus::Pending);
    }

    #[tokio::test]
    async fn test_second_decision_leaves_first_intact() {
        let svc = service();
        let record = svc.submit(submission("job1")).await.unwrap();
        let rejected = svc.reject(rejection(&record.id)).await.unwrap();

        assert_matches!(
            svc.approve(approval(&record.id, "changed my mind")).await,
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            svc.reject(rejection(&record.id)).await,
            Err(CoreError::Conflict(_))
        );

        let stored = svc.get(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, rejected.status);
        assert_eq!(stored.feedback, rejected.feedback);
        assert_eq!(stored.decided_at, rejected.decided_at);
    }

    #[tokio::test]
    async fn test_list_by_job_returns_all_newest_first() {
        let svc = service();
        for _ in 0..5 {
            svc.submit(submission("job3")).await.unwrap();
        }
        svc.submit(submission("job1")).await.unwrap();

        let listed = svc.list_by_job("job3").await.unwrap();
        assert_eq!(listed.len(), 5);
        assert!(listed
            .windows(2)
            .all(|w| w[0].submitted_at >= w[1].submitted_at));
    }

    #[tokio::test]
    async fn test_list_pending_by_client_excludes_decided_and_other_clients() {
        let svc = service();
        let a = svc.submit(submission("job1")).await.unwrap();
        let b = svc.submit(submission("job_171")).await.unwrap();
        let c = svc.submit(submission("job3")).await.unwrap();
        svc.approve(approval(&a.id, "")).await.unwrap();
        svc.reject(rejection(&c.id)).await.unwrap();

        let mut other = submission("job2");
        other.credentials = CredentialPair::new("anotherSecurePass456", "client456_signature_2024");
        svc.submit(other).await.unwrap();

        let pending = svc.list_pending_by_client("client123").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b.id);
        assert!(pending.iter().all(|r| r.status == CompletionStatus::Pending));

        let theirs = svc.list_pending_by_client("client456").await.unwrap();
        assert_eq!(theirs.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        assert!(service().get("completion_nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validate_client_credentials() {
        let svc = service();
        assert!(svc.validate_client_credentials("client123", PASSWORD, SIGNATURE).await);
        assert!(!svc.validate_client_credentials("client123", PASSWORD, "x").await);
        assert!(!svc.validate_client_credentials("ghost", PASSWORD, SIGNATURE).await);
    }

    #[tokio::test]
    async fn test_client_info() {
        let svc = service();
        let info = svc.client_info("client123").await.unwrap();
        assert_eq!(info.name, "John Client");
        assert!(svc.client_info("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_latency_leaves_store_untouched() {
        let token = CancellationToken::new();
        token.cancel();
        let latency = FixedLatency::new(
            Duration::from_secs(3600),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        )
        .with_cancellation(token);
        let store = Arc::new(CompletionStore::new());
        let svc = CompletionService::new(
            Arc::clone(&store),
            Arc::new(StaticCredentials::seeded()),
            Arc::new(JobClientMap::seeded()),
            Arc::new(latency),
        );

        assert_matches!(svc.submit(submission("job1")).await, Err(CoreError::Cancelled));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_approvals_decide_once() {
        let svc = Arc::new(service());
        let record = svc.submit(submission("job1")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let svc = Arc::clone(&svc);
            let id = record.id.clone();
            handles.push(tokio::spawn(async move {
                svc.approve(approval(&id, &format!("attempt {i}"))).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_matches!(e, CoreError::Conflict(_)),
            }
        }
        assert_eq!(successes, 1);
    }
}
