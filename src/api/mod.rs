// src/api/mod.rs

pub mod email;
pub mod scanner;
pub mod url;

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

/// Typed API failure, mapped onto an HTTP status and a stable error code.
///
/// `NotFound` is part of the contract for progress queries: an unknown
/// scan id is a valid outcome for the caller, never a server error.
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    NotAuthorized(String),
    NotFound(String),
    TargetUnreachable(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidInput(m) => (StatusCode::BAD_REQUEST, "invalid_input", m),
            ApiError::NotAuthorized(m) => (StatusCode::FORBIDDEN, "not_authorized", m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
            ApiError::TargetUnreachable(m) => (StatusCode::BAD_GATEWAY, "target_unreachable", m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", m),
        };
        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    project: &'static str,
    version: &'static str,
    status: &'static str,
    uptime_secs: i64,
}

/// Simple health-check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = (chrono::Utc::now() - state.start_time).num_seconds();
    Json(HealthResponse {
        project: "CyberGuardX",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        uptime_secs: uptime,
    })
}

/// Builds the HTTP application: all routes, shared state, permissive CORS
/// for the separately-hosted frontend.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/", get(health))
        .route("/check-email", post(email::check_email))
        .route("/check-url", post(url::check_url))
        .route("/scan-website", post(scanner::scan_website))
        .route("/scan-progress/{scan_id}", get(scanner::scan_progress))
        .route("/scan-history", get(scanner::scan_history))
        .with_state(state)
        .layer(cors)
}
