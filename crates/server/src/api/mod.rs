//! HTTP handlers.
//!
//! Shared error shape and the trigger token guard live here in mod.rs.

mod escalation;
mod health;


use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// ── Token guard ──────────────────────────────────────────────────

/// Return 401 unless the request carries `Authorization: Bearer <token>`
/// matching the configured trigger token. No token configured = open.
pub(crate) fn require_token(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let Some(expected) = state.trigger_token.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    if provided == Some(expected) {
        return Ok(());
    }
    tracing::warn!("Rejected escalation trigger with missing or invalid token");
    Err((
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("missing or invalid trigger token")),
    ))
}

// ── Re-exports ───────────────────────────────────────────────────

pub use escalation::{escalation_settings, run_escalation};
pub use health::health;
