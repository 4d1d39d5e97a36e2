//! Escalation trigger and settings endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use upkeep_escalation::RunReport;

use crate::state::AppState;

use super::ErrorResponse;

/// Run the engine once. 200 with the report unless a fatal error aborted
/// the run, in which case 500 with `success: false` and `error`.
pub async fn run_escalation(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = super::require_token(&state, &headers) {
        return rejection.into_response();
    }

    let _guard = state.run_guard.lock().await;
    match state.runner.run().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!(error = %e, "Escalation trigger failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(RunReport::fatal(&e))).into_response()
        }
    }
}

/// Effective schedule settings after merging the store over defaults.
pub async fn escalation_settings(State(state): State<Arc<AppState>>) -> Response {
    match state.runner.settings().await {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}
