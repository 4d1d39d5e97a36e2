use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Mutex;
use upkeep_escalation::EscalationRunner;

pub struct AppState {
    pub runner: Arc<EscalationRunner>,
    /// `None` only in tests; the server refuses to start without a database.
    pub pg_pool: Option<PgPool>,
    /// Required bearer token for the trigger, if configured.
    pub trigger_token: Option<String>,
    /// Serializes in-process runs (HTTP trigger and cron trigger).
    pub run_guard: Mutex<()>,
}

impl AppState {
    pub fn new(runner: Arc<EscalationRunner>, pg_pool: Option<PgPool>, trigger_token: Option<String>) -> Self {
        Self {
            runner,
            pg_pool,
            trigger_token: trigger_token.filter(|t| !t.is_empty()),
            run_guard: Mutex::new(()),
        }
    }
}
