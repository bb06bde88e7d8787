//! Client credential lookup and job-to-client resolution.
//!
//! Both concerns sit behind traits so a real identity provider or job
//! registry can replace the seeded tables without touching the workflow.
//! The seeded credentials are placeholders: plaintext, no expiry, no
//! rate limiting.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::ClientId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Entity name used in `CoreError::NotFound` for a missing credential mapping.
pub const CLIENT_ENTITY: &str = "Client";

/// Client that owns every `job_*` posting and every unmapped job.
pub const DEFAULT_CLIENT_ID: &str = "client123";

/// Job ids with this prefix were posted through the job form.
pub const POSTED_JOB_PREFIX: &str = "job_";

/// Single message for any credential mismatch; never says which field failed.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid client credentials";

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// The `(password, signature)` pair a client presents to authorize a decision.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub password: String,
    pub signature: String,
}

impl CredentialPair {
    pub fn new(password: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            signature: signature.into(),
        }
    }

    /// Exact match on both fields.
    pub fn matches(&self, password: &str, signature: &str) -> bool {
        self.password == password && self.signature == signature
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("password", &"<redacted>")
            .field("signature", &"<redacted>")
            .finish()
    }
}

/// Public view of a client. Carries no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientProfile {
    pub client_id: ClientId,
    pub name: String,
}

/* --------------------------------------------------------------------------
Traits
-------------------------------------------------------------------------- */

/// Resolves the credential pair registered for a client.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// `None` when no credentials are registered for `client_id`.
    async fn resolve(&self, client_id: &str) -> Option<CredentialPair>;

    /// Display information for `client_id`, if known.
    async fn profile(&self, client_id: &str) -> Option<ClientProfile>;
}

/// Derives the owning client of a job.
pub trait ClientDirectory: Send + Sync {
    fn client_for_job(&self, job_id: &str) -> ClientId;
}

/// Check a presented pair against the client's registered credentials.
///
/// Unknown client maps to `NotFound`; any mismatch maps to one opaque
/// `Unauthorized` error.
pub async fn authenticate(
    resolver: &dyn CredentialResolver,
    client_id: &str,
    password: &str,
    signature: &str,
) -> Result<(), CoreError> {
    let expected = resolver
        .resolve(client_id)
        .await
        .ok_or_else(|| CoreError::NotFound {
            entity: CLIENT_ENTITY,
            id: client_id.to_string(),
        })?;

    if !expected.matches(password, signature) {
        return Err(CoreError::Unauthorized(
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Seeded implementations
-------------------------------------------------------------------------- */

struct ClientEntry {
    name: String,
    credentials: CredentialPair,
}

/// In-memory credential table.
#[derive(Default)]
pub struct StaticCredentials {
    clients: HashMap<ClientId, ClientEntry>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo clients the marketplace ships with.
    pub fn seeded() -> Self {
        Self::new()
            .with_client(
                "client123",
                "John Client",
                CredentialPair::new("securePassword123", "client123_signature_2024"),
            )
            .with_client(
                "client456",
                "Jane Client",
                CredentialPair::new("anotherSecurePass456", "client456_signature_2024"),
            )
    }

    pub fn with_client(
        mut self,
        client_id: impl Into<ClientId>,
        name: impl Into<String>,
        credentials: CredentialPair,
    ) -> Self {
        self.clients.insert(
            client_id.into(),
            ClientEntry {
                name: name.into(),
                credentials,
            },
        );
        self
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentials {
    async fn resolve(&self, client_id: &str) -> Option<CredentialPair> {
        self.clients.get(client_id).map(|c| c.credentials.clone())
    }

    async fn profile(&self, client_id: &str) -> Option<ClientProfile> {
        self.clients.get(client_id).map(|c| ClientProfile {
            client_id: client_id.to_string(),
            name: c.name.clone(),
        })
    }
}

/// Job ownership table with a fallback client.
///
/// `job_*` ids always belong to the fallback client; other ids are looked
/// up in the explicit table and default to the fallback when absent.
pub struct JobClientMap {
    jobs: HashMap<String, ClientId>,
    fallback: ClientId,
}

impl JobClientMap {
    pub fn new(fallback: impl Into<ClientId>) -> Self {
        Self {
            jobs: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    /// The demo job listings.
    pub fn seeded() -> Self {
        Self::new(DEFAULT_CLIENT_ID)
            .with_job("job1", "client123")
            .with_job("job2", "client456")
            .with_job("job3", "client123")
            .with_job("job4", "client456")
            .with_job("demo-job-1", "client123")
    }

    pub fn with_job(mut self, job_id: impl Into<String>, client_id: impl Into<ClientId>) -> Self {
        self.jobs.insert(job_id.into(), client_id.into());
        self
    }
}

impl ClientDirectory for JobClientMap {
    fn client_for_job(&self, job_id: &str) -> ClientId {
        if job_id.starts_with(POSTED_JOB_PREFIX) {
            return self.fallback.clone();
        }
        self.jobs
            .get(job_id)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
