// src/api/email.rs

//! `POST /check-email` — offline email breach lookup.

use crate::api::ApiError;
use crate::core::breach::{BreachDetail, validate_email};
use crate::core::models::RiskLevel;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct EmailCheckRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailCheckResponse {
    pub email: String,
    pub breached: bool,
    pub pwned_count: usize,
    pub risk_level: RiskLevel,
    pub message: String,
    pub breaches: Vec<BreachDetail>,
    pub recommendations: Vec<String>,
}

pub async fn check_email(
    State(state): State<AppState>,
    Json(payload): Json<EmailCheckRequest>,
) -> Result<Json<EmailCheckResponse>, ApiError> {
    validate_email(&payload.email).map_err(ApiError::InvalidInput)?;

    let report = state.breach_checker.check(&payload.email);
    info!(
        breached = report.breached,
        pwned_count = report.pwned_count,
        "Email breach check completed."
    );

    Ok(Json(EmailCheckResponse {
        email: payload.email,
        breached: report.breached,
        pwned_count: report.pwned_count,
        risk_level: report.risk_level,
        message: report.message,
        breaches: report.breaches,
        recommendations: report.recommendations,
    }))
}
