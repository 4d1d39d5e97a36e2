//! Collaborator contracts consumed by the runner.
//!
//! The runner never decides *which* work orders are due or *who* must be
//! notified; those policies live behind these traits. PostgreSQL
//! implementations are in the server crate.

use std::collections::HashMap;

use upkeep_core::{DueWorkOrder, EscalationTier, Recipient, ReminderRecord};
use uuid::Uuid;

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
#[error("{context}: {source}")]
pub struct StoreError {
    context: String,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Flat key/value settings table.
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<HashMap<String, String>, StoreError>;
}

/// Work orders currently eligible for a reminder, already excluding
/// `(work order, tier)` pairs that have a ledger entry.
#[async_trait::async_trait]
pub trait DueWorkOrderSource: Send + Sync {
    async fn due_work_orders(&self) -> Result<Vec<DueWorkOrder>, StoreError>;
}

/// Ordered, deduplicated recipients for a work order at a tier.
#[async_trait::async_trait]
pub trait RecipientResolver: Send + Sync {
    async fn resolve(&self, work_order_id: Uuid, tier: EscalationTier) -> Result<Vec<Recipient>, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Recorded,
    /// A record for the same `(work order, tier)` already existed.
    AlreadyRecorded,
}

/// Append-only record of sent reminders.
#[async_trait::async_trait]
pub trait ReminderLedger: Send + Sync {
    async fn contains(&self, work_order_id: Uuid, tier: EscalationTier) -> Result<bool, StoreError>;

    async fn append(&self, record: &ReminderRecord) -> Result<AppendOutcome, StoreError>;
}
