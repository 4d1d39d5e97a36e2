use thiserror::Error;
use upkeep_notify::NotifyError;

use crate::sources::StoreError;

#[derive(Debug, Error)]
pub enum EscalationError {
    #[error("configuration store unavailable: {0}")]
    SettingsUnavailable(#[source] StoreError),

    #[error("due work order query failed: {0}")]
    DueQueryFailed(#[source] StoreError),

    #[error("recipient resolution failed: {0}")]
    RecipientLookup(#[source] StoreError),

    #[error("message rendering failed: {0}")]
    Render(#[source] NotifyError),

    #[error("no notification delivered ({attempts} endpoint attempts, {recipients} recipients)")]
    NothingDelivered { attempts: usize, recipients: usize },

    #[error("ledger write failed: {0}")]
    Ledger(#[source] StoreError),
}

impl EscalationError {
    /// Fatal errors abort the whole run; everything else is per work order.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EscalationError::SettingsUnavailable(_) | EscalationError::DueQueryFailed(_)
        )
    }
}
