// src/api/scanner.rs

//! Website scanning endpoints: `POST /scan-website`,
//! `GET /scan-progress/{scan_id}`, and `GET /scan-history`.

use crate::api::ApiError;
use crate::core::models::{Grade, RiskLevel, ScanProgress, ScanRecord};
use crate::core::orchestrator::{ScanAuthorization, ScanError, run_website_scan};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const HISTORY_DEFAULT_LIMIT: usize = 20;
const HISTORY_MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct WebsiteScanRequest {
    pub url: String,
    #[serde(default)]
    pub confirmed_permission: bool,
    #[serde(default)]
    pub owner_confirmation: bool,
    #[serde(default)]
    pub legal_responsibility: bool,
}

#[derive(Debug, Serialize)]
pub struct WebsiteScanResponse {
    pub scan_id: Uuid,
    pub url: String,
    pub scan_timestamp: DateTime<Utc>,
    pub scan_duration_ms: u64,
    pub overall_grade: Grade,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub http_grade: Grade,
    pub ssl_grade: Grade,
    pub dns_grade: Grade,
    pub critical_issues_count: usize,
    pub high_issues_count: usize,
    pub medium_issues_count: usize,
    pub recommendations: Vec<String>,
}

impl From<ScanRecord> for WebsiteScanResponse {
    fn from(record: ScanRecord) -> Self {
        Self {
            scan_id: record.scan_id,
            url: record.url,
            scan_timestamp: record.scanned_at,
            scan_duration_ms: record.scan_duration_ms,
            overall_grade: record.overall_grade,
            risk_score: record.risk_score,
            risk_level: record.risk_level,
            http_grade: record.http_grade,
            ssl_grade: record.ssl_grade,
            dns_grade: record.dns_grade,
            critical_issues_count: record.critical_issues_count,
            high_issues_count: record.high_issues_count,
            medium_issues_count: record.medium_issues_count,
            recommendations: record.recommendations,
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidInput(m) => ApiError::InvalidInput(m),
            ScanError::NotAuthorized(m) => ApiError::NotAuthorized(m),
            ScanError::TargetUnreachable(m) => ApiError::TargetUnreachable(m),
        }
    }
}

/// Comprehensive passive website security assessment.
///
/// Only scan targets you own or have written permission to scan; the
/// request is refused unless all three permission flags are set.
pub async fn scan_website(
    State(state): State<AppState>,
    Json(payload): Json<WebsiteScanRequest>,
) -> Result<Json<WebsiteScanResponse>, ApiError> {
    let auth = ScanAuthorization {
        confirmed_permission: payload.confirmed_permission,
        owner_confirmation: payload.owner_confirmation,
        legal_responsibility: payload.legal_responsibility,
    };

    let record = run_website_scan(
        &state.tracker,
        state.history.as_ref(),
        &payload.url,
        auth,
        state.config.check_timeout(),
    )
    .await?;

    Ok(Json(record.into()))
}

/// Progress snapshot for a running or recently finished scan.
///
/// Unknown ids produce a 404, which callers treat as a valid "no such
/// scan" outcome.
pub async fn scan_progress(
    State(state): State<AppState>,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<ScanProgress>, ApiError> {
    state
        .tracker
        .get(scan_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Scan '{}' not found", scan_id)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// Most recent completed scans, newest first.
pub async fn scan_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<WebsiteScanResponse>> {
    let limit = params
        .limit
        .unwrap_or(HISTORY_DEFAULT_LIMIT)
        .min(HISTORY_MAX_LIMIT);
    let records = state.history.recent(limit);
    Json(records.into_iter().map(WebsiteScanResponse::from).collect())
}
