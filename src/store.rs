//! Persistence collaborators: the workflow document store and the identity
//! provider.
//!
//! Storage is a key-value document store keyed by `(user id, workflow id)`
//! with upsert-with-merge and point lookup, expressed as a trait so
//! backends are pluggable. The in-memory implementation is the volatile
//! backend used for tests and development; durable backends live with the
//! hosting application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

use crate::document::WorkflowDocument;

/// Store write/read failure. In-memory graph state is never rolled back on
/// a failed write; the edit is preserved locally even if unsaved.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("workflow store error: {message}")]
    #[diagnostic(code(taskweave::store::backend))]
    Backend { message: String },
}

/// The caller-supplied portion of a stored workflow; timestamps are managed
/// by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub name: String,
    pub description: String,
    pub document: WorkflowDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// A persisted workflow with store-managed timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredWorkflow {
    #[serde(flatten)]
    pub record: WorkflowRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry for the stored-workflow sidebar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// Key-value document store keyed by `(user, workflow id)`.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Insert or merge a record. On merge, `created_at` is preserved and
    /// `updated_at` advances.
    async fn upsert(
        &self,
        user: &str,
        workflow_id: &str,
        record: WorkflowRecord,
    ) -> Result<(), StoreError>;

    /// Point lookup.
    async fn get(&self, user: &str, workflow_id: &str) -> Result<Option<StoredWorkflow>, StoreError>;

    /// All workflows for a user, most recently updated first.
    async fn list(&self, user: &str) -> Result<Vec<WorkflowSummary>, StoreError>;

    /// Remove a stored workflow. Removing a missing id is not an error.
    async fn delete(&self, user: &str, workflow_id: &str) -> Result<(), StoreError>;
}

/// Volatile store for testing and development.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<FxHashMap<(String, String), StoredWorkflow>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryStore {
    async fn upsert(
        &self,
        user: &str,
        workflow_id: &str,
        record: WorkflowRecord,
    ) -> Result<(), StoreError> {
        let key = (user.to_string(), workflow_id.to_string());
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&key) {
            Some(existing) => {
                existing.record = record;
                existing.updated_at = now;
            }
            None => {
                entries.insert(
                    key,
                    StoredWorkflow {
                        record,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn get(&self, user: &str, workflow_id: &str) -> Result<Option<StoredWorkflow>, StoreError> {
        let key = (user.to_string(), workflow_id.to_string());
        Ok(self.entries.lock().unwrap().get(&key).cloned())
    }

    async fn list(&self, user: &str) -> Result<Vec<WorkflowSummary>, StoreError> {
        let entries = self.entries.lock().unwrap();
        let mut summaries: Vec<WorkflowSummary> = entries
            .iter()
            .filter(|((u, _), _)| u == user)
            .map(|((_, id), stored)| WorkflowSummary {
                id: id.clone(),
                name: stored.record.name.clone(),
                updated_at: stored.updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn delete(&self, user: &str, workflow_id: &str) -> Result<(), StoreError> {
        let key = (user.to_string(), workflow_id.to_string());
        self.entries.lock().unwrap().remove(&key);
        Ok(())
    }
}

/// Identity provider yielding a stable user id for store keys.
pub trait Identity: Send + Sync {
    /// Stable user id, or `None` when no user is signed in.
    fn user_id(&self) -> Option<String>;

    /// Display name recorded alongside saved workflows.
    fn display_name(&self) -> Option<String> {
        None
    }
}

/// Fixed identity for tests and single-user deployments.
#[derive(Clone, Debug)]
pub struct StaticIdentity {
    pub user_id: String,
    pub display_name: Option<String>,
}

impl StaticIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
        }
    }
}

impl Identity for StaticIdentity {
    fn user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.clone()
    }
}
