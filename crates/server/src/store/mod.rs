//! PostgreSQL implementations of the escalation collaborators.
//!
//! [`PgStore`] wraps a shared pool. Each concern lives in its own file:
//! settings, the due view, the recipient policy function, push
//! subscriptions and the reminder ledger. Query failures are wrapped in
//! [`StoreError`] with the operation as context.

mod due;
mod ledger;
mod recipients;
mod settings;
mod subscriptions;


use sqlx::PgPool;
use upkeep_escalation::StoreError;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Wrap a database error with the operation that failed.
fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::new(context, e)
}

/// A row held a value the domain types reject.
fn decode_err(context: &'static str, e: upkeep_core::UpkeepError) -> StoreError {
    StoreError::new(context, e)
}
