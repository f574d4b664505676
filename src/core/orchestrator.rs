// src/core/orchestrator.rs

//! Scan lifecycle coordination: authorization gate, target validation and
//! reachability, the concurrent sub-checks, scoring, and persistence.
//! The handler in the API layer stays thin; everything stateful runs here.

use crate::core::history::HistoryStore;
use crate::core::models::ScanRecord;
use crate::core::progress::ProgressTracker;
use crate::core::scanner::run_full_scan;
use crate::core::scoring::assess;
use chrono::Utc;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

/// Caller-asserted permission flags. An active scan of third-party
/// infrastructure is refused unless every flag is set.
#[derive(Debug, Clone, Copy)]
pub struct ScanAuthorization {
    pub confirmed_permission: bool,
    pub owner_confirmation: bool,
    pub legal_responsibility: bool,
}

impl ScanAuthorization {
    fn missing_flag(&self) -> Option<&'static str> {
        if !self.confirmed_permission {
            Some("You must confirm you have permission to scan this website")
        } else if !self.owner_confirmation {
            Some("You must confirm you own this website or have written permission")
        } else if !self.legal_responsibility {
            Some("You must accept legal responsibility for this scan")
        } else {
            None
        }
    }
}

/// Why a scan request was rejected or a scan failed.
#[derive(Debug)]
pub enum ScanError {
    /// Malformed target URL. No scan is started.
    InvalidInput(String),
    /// Missing permission flags. No scan is started, no side effects.
    NotAuthorized(String),
    /// The target could not be resolved at all; the scan is marked FAILED.
    TargetUnreachable(String),
}

/// Runs one website scan end to end.
///
/// Validation happens before any progress entry exists, so rejected
/// requests leave no trace. Once validation passes the scan moves through
/// `PENDING -> RUNNING(phase) -> COMPLETED | FAILED`, and only COMPLETED
/// scans append to history.
pub async fn run_website_scan(
    tracker: &ProgressTracker,
    history: &dyn HistoryStore,
    raw_url: &str,
    auth: ScanAuthorization,
    check_timeout: Duration,
) -> Result<ScanRecord, ScanError> {
    // Authorization gate first: an unauthorized request must have no side
    // effects at all.
    if let Some(reason) = auth.missing_flag() {
        warn!(url = raw_url, reason, "Scan request refused.");
        return Err(ScanError::NotAuthorized(reason.to_string()));
    }

    let parsed = Url::parse(raw_url)
        .map_err(|e| ScanError::InvalidInput(format!("Invalid URL: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScanError::InvalidInput(
            "URL must use HTTP or HTTPS protocol".to_string(),
        ));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| ScanError::InvalidInput("Invalid URL: missing host".to_string()))?
        .to_string();

    let started = Instant::now();
    let scan_id = tracker.create(raw_url);
    info!(%scan_id, url = raw_url, "Starting website scan.");

    // The whole scan is pointless if the host does not resolve; fail fast
    // instead of letting every sub-check time out individually.
    tracker.advance(scan_id, "Resolving target", 5);
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let resolved = tokio::time::timeout(check_timeout, resolver.lookup_ip(host.as_str())).await;
    match resolved {
        Ok(Ok(lookup)) if lookup.iter().next().is_some() => {}
        Ok(Ok(_)) | Ok(Err(_)) | Err(_) => {
            let reason = format!("Cannot resolve target host '{}'", host);
            tracker.fail(scan_id, &reason);
            warn!(%scan_id, host = %host, "Target unreachable, scan failed.");
            return Err(ScanError::TargetUnreachable(reason));
        }
    }

    tracker.advance(scan_id, "Running security checks", 10);

    // Sub-checks complete in any order; each bumps the percentage by a
    // fixed step and the tracker keeps it monotonic.
    let phases_done = AtomicU8::new(0);
    let report = run_full_scan(raw_url, &host, check_timeout, |phase| {
        let done = phases_done.fetch_add(1, Ordering::Relaxed) + 1;
        tracker.advance(
            scan_id,
            &format!("{} check complete", phase),
            10 + 25 * done,
        );
    })
    .await;

    tracker.advance(scan_id, "Generating report", 90);
    let assessment = assess(&report);

    let record = ScanRecord {
        scan_id,
        url: raw_url.to_string(),
        overall_grade: assessment.overall_grade,
        risk_score: assessment.risk_score,
        risk_level: assessment.risk_level,
        http_grade: assessment.http_grade,
        ssl_grade: assessment.ssl_grade,
        dns_grade: assessment.dns_grade,
        critical_issues_count: assessment.critical_issues_count,
        high_issues_count: assessment.high_issues_count,
        medium_issues_count: assessment.medium_issues_count,
        recommendations: assessment.recommendations,
        scan_duration_ms: started.elapsed().as_millis() as u64,
        scanned_at: Utc::now(),
    };

    history.append(record.clone());
    tracker.complete(scan_id);
    info!(
        %scan_id,
        grade = %record.overall_grade,
        risk_score = record.risk_score,
        duration_ms = record.scan_duration_ms,
        "Website scan completed."
    );

    Ok(record)
}
