//! In-process cron trigger for the escalation engine.
//!
//! Optional: deployments usually invoke `/escalation/run` from an external
//! scheduler. When `ESCALATION_CRON` is set, this task sleeps until each
//! upcoming fire time and runs the engine itself. The run gate still
//! applies, so an hourly schedule is the normal choice.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use tracing::{error, info, warn};

use crate::state::AppState;

/// Run the escalation engine on `schedule` forever.
pub async fn run_cron_trigger(state: Arc<AppState>, schedule: Schedule) {
    info!("escalation cron trigger started");

    loop {
        let Some(next_fire) = schedule.upcoming(Utc).next() else {
            warn!("cron trigger: schedule has no upcoming fire time, stopping");
            return;
        };
        let wait = (next_fire - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        let _guard = state.run_guard.lock().await;
        match state.runner.run().await {
            Ok(report) => info!(
                sent = report.sent,
                reason = report.reason.unwrap_or("-"),
                message = %report.message,
                "cron trigger: escalation run finished"
            ),
            Err(e) => error!(error = %e, "cron trigger: escalation run failed"),
        }
    }
}

/// Parse a cron expression, auto-prepending "0 " for 5-field expressions.
///
/// The `cron` crate requires 6 fields (sec min hr dom mon dow), but users
/// typically write 5-field cron (min hr dom mon dow).
pub fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() == 5 {
        Schedule::from_str(&format!("0 {}", expr))
    } else {
        Schedule::from_str(expr)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
