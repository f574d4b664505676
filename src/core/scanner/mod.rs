// src/core/scanner/mod.rs

// This file acts as the public interface for the `scanner` module.
// It declares and makes all sub-scanner modules public.
pub mod dns_scanner;
pub mod headers_scanner;
pub mod ssl_scanner;

use std::fmt;
use std::time::Duration;

use crate::core::models::ScanReport;
use self::dns_scanner::{degraded_dns_results, run_dns_scan};
use self::headers_scanner::{degraded_headers_results, run_headers_scan};
use self::ssl_scanner::{degraded_ssl_results, run_ssl_scan};
use tokio::time::timeout;
use tracing::warn;

/// The three independent sub-checks of a website scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Headers,
    Tls,
    Dns,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Headers => write!(f, "headers"),
            ScanPhase::Tls => write!(f, "tls"),
            ScanPhase::Dns => write!(f, "dns"),
        }
    }
}

/// Executes all three sub-checks concurrently and aggregates the results.
///
/// `tokio::join!` runs the headers, TLS, and DNS scanners in parallel and
/// merges their outputs into a fixed tuple, so the report is deterministic
/// regardless of completion order. Each sub-check is bounded by
/// `check_timeout`; on expiry it degrades to its worst-case result instead
/// of blocking the scan. `on_phase` is invoked as each sub-check finishes,
/// which feeds the progress tracker.
///
/// # Arguments
///
/// * `url` - The full target URL (used by the headers scanner).
/// * `host` - The target host (used by the TLS and DNS scanners).
/// * `check_timeout` - Upper bound for each individual sub-check.
/// * `on_phase` - Callback fired when a sub-check completes.
///
/// # Returns
///
/// A `ScanReport` struct containing the results from all sub-checks.
pub async fn run_full_scan(
    url: &str,
    host: &str,
    check_timeout: Duration,
    on_phase: impl Fn(ScanPhase),
) -> ScanReport {
    let headers_check = async {
        let results = match timeout(check_timeout, run_headers_scan(url, check_timeout)).await {
            Ok(results) => results,
            Err(_) => {
                warn!(url, "Headers sub-check timed out, degrading to worst-case grade.");
                degraded_headers_results("Headers check timed out")
            }
        };
        on_phase(ScanPhase::Headers);
        results
    };

    let ssl_check = async {
        let results = match timeout(check_timeout, run_ssl_scan(host, check_timeout)).await {
            Ok(results) => results,
            Err(_) => {
                warn!(host, "TLS sub-check timed out, degrading to worst-case grade.");
                degraded_ssl_results("TLS check timed out")
            }
        };
        on_phase(ScanPhase::Tls);
        results
    };

    let dns_check = async {
        let results = match timeout(check_timeout, run_dns_scan(host)).await {
            Ok(results) => results,
            Err(_) => {
                warn!(host, "DNS sub-check timed out, degrading to worst-case grade.");
                degraded_dns_results("DNS check timed out")
            }
        };
        on_phase(ScanPhase::Dns);
        results
    };

    let (headers_results, ssl_results, dns_results) =
        tokio::join!(headers_check, ssl_check, dns_check);

    ScanReport {
        dns_results,
        ssl_results,
        headers_results,
    }
}
