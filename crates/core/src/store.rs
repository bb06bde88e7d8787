//! In-memory registry of completion records.
//!
//! The store is created once by the composition root and shared behind an
//! `Arc`. It is not durable; records live as long as the process.

use tokio::sync::RwLock;

use crate::completion::{CompletionRecord, COMPLETION_ENTITY};
use crate::error::CoreError;

/// Thread-safe completion registry.
///
/// Mutations go through [`CompletionStore::update`], which applies the change
/// to a copy and commits it only on success, all under one write lock.
#[derive(Default)]
pub struct CompletionStore {
    records: RwLock<Vec<CompletionRecord>>,
}

impl CompletionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new record.
    pub async fn insert(&self, record: CompletionRecord) {
        self.records.write().await.push(record);
    }

    /// Fetch a copy of a record by id.
    pub async fn get(&self, id: &str) -> Option<CompletionRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Apply `change` to the record with `id` atomically.
    ///
    /// The record is left untouched when `change` fails.
    pub async fn update<F>(&self, id: &str, change: F) -> Result<CompletionRecord, CoreError>
    where
        F: FnOnce(&mut CompletionRecord) -> Result<(), CoreError>,
    {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: COMPLETION_ENTITY,
                id: id.to_string(),
            })?;

        let mut draft = slot.clone();
        change(&mut draft)?;
        *slot = draft.clone();
        Ok(draft)
    }

    /// All records for `job_id`, newest first.
    pub async fn list_by_job(&self, job_id: &str) -> Vec<CompletionRecord> {
        self.list_where(|r| r.job_id == job_id).await
    }

    /// Records matching `predicate`, newest first.
    ///
    /// Records submitted at the same instant keep reverse insertion order.
    pub async fn list_where<P>(&self, predicate: P) -> Vec<CompletionRecord>
    where
        P: Fn(&CompletionRecord) -> bool,
    {
        let mut matched: Vec<CompletionRecord> = self
            .records
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| predicate(*r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        matched
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
