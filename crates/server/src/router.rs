//! HTTP router construction.
//!
//! Assembles the Axum routes and middleware into a single `Router`.

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
///
/// `cors_origin` of `*` yields a permissive CORS layer; anything else is
/// treated as the single allowed origin.
pub fn build_router(state: Arc<AppState>, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/escalation/run",
            get(api::run_escalation).post(api::run_escalation),
        )
        .route("/escalation/settings", get(api::escalation_settings))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static("x-client-info"),
                HeaderName::from_static("apikey"),
            ]),
        Err(e) => {
            warn!(origin, error = %e, "Invalid CORS_ORIGIN, falling back to permissive");
            CorsLayer::permissive()
        }
    }
}
