// src/core/scanner/headers_scanner.rs

use crate::core::knowledge_base::finding;
use crate::core::models::{AnalysisFinding, HeaderData, HeadersResults, ScanResult};
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Checks for the presence and validity of a specific HTTP header in a `HeaderMap`.
///
/// Returns `Ok(Some(HeaderData))` if the header is found, `Ok(None)` if it
/// is absent. Non-UTF-8 header values are reported as present with a
/// placeholder value.
fn check_header(headers: &HeaderMap, name: &str) -> ScanResult<HeaderData> {
    debug!(header_name = name, "Checking for header.");
    if let Some(value) = headers.get(name) {
        match value.to_str() {
            Ok(s) => {
                debug!(header_name = name, value = s, "Header found.");
                Ok(Some(HeaderData { value: s.to_string() }))
            }
            Err(_) => {
                warn!(header_name = name, "Header found but contained invalid UTF-8.");
                Ok(Some(HeaderData { value: "[Invalid UTF-8]".to_string() }))
            }
        }
    } else {
        debug!(header_name = name, "Header not found.");
        Ok(None)
    }
}

/// Runs a scan for common security-related HTTP headers.
///
/// Sends a single passive GET request to the target URL and checks the
/// response for HSTS, CSP, X-Frame-Options, X-Content-Type-Options,
/// Referrer-Policy, and Permissions-Policy.
pub async fn run_headers_scan(url: &str, timeout: Duration) -> HeadersResults {
    info!(url, "Starting headers scan.");

    let client = match reqwest::Client::builder()
        .user_agent("CyberGuardX-SecurityScanner/2.0")
        .timeout(timeout)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            // If the client cannot be built, it's a critical failure for this scan.
            error!(error = %e, "Failed to build HTTP client for headers scan.");
            let mut results = HeadersResults::default();
            results.error = Some(format!("Failed to build HTTP client: {}", e));
            results.analysis = analyze_headers_results(&results);
            return results;
        }
    };

    match client.get(url).send().await {
        Ok(response) => {
            info!(status = %response.status(), "Received HTTP response for headers scan.");
            let headers = response.headers();
            // Check for each of the target security headers.
            let mut results = HeadersResults {
                error: None,
                hsts: check_header(headers, "strict-transport-security"),
                csp: check_header(headers, "content-security-policy"),
                x_frame_options: check_header(headers, "x-frame-options"),
                x_content_type_options: check_header(headers, "x-content-type-options"),
                referrer_policy: check_header(headers, "referrer-policy"),
                permissions_policy: check_header(headers, "permissions-policy"),
                analysis: Vec::new(),
            };
            results.analysis = analyze_headers_results(&results);
            info!(findings = %results.analysis.len(), "Headers scan finished.");
            results
        }
        Err(e) => {
            // If the HTTP request fails, populate the error field and analyze.
            error!(url = %url, error = %e, "HTTP request failed for headers scan.");
            let mut results = HeadersResults::default();
            results.error = Some(format!("HTTP request failed: {}", e));
            results.analysis = analyze_headers_results(&results);
            results
        }
    }
}

/// Degraded result used when the sub-check exceeds its overall timeout.
pub fn degraded_headers_results(reason: &str) -> HeadersResults {
    let mut results = HeadersResults::default();
    results.error = Some(reason.to_string());
    results.analysis = analyze_headers_results(&results);
    results
}

/// Analyzes the collected header data to generate security findings,
/// one per missing header.
fn analyze_headers_results(results: &HeadersResults) -> Vec<AnalysisFinding> {
    debug!("Analyzing collected header data.");
    let mut analyses = Vec::new();

    // If there was a fundamental error in the request, flag it as the
    // single worst-case finding for this dimension.
    if results.error.is_some() {
        debug!("Request error detected, adding HEADERS_REQUEST_FAILED finding.");
        analyses.push(finding("HEADERS_REQUEST_FAILED"));
        return analyses;
    }

    if let Ok(None) = &results.hsts {
        debug!("HSTS header missing.");
        analyses.push(finding("HEADERS_HSTS_MISSING"));
    }

    if let Ok(None) = &results.csp {
        debug!("CSP header missing.");
        analyses.push(finding("HEADERS_CSP_MISSING"));
    }

    if let Ok(None) = &results.x_frame_options {
        debug!("X-Frame-Options header missing.");
        analyses.push(finding("HEADERS_X_FRAME_OPTIONS_MISSING"));
    }

    if let Ok(None) = &results.x_content_type_options {
        debug!("X-Content-Type-Options header missing.");
        analyses.push(finding("HEADERS_X_CONTENT_TYPE_OPTIONS_MISSING"));
    }

    if let Ok(None) = &results.referrer_policy {
        debug!("Referrer-Policy header missing.");
        analyses.push(finding("HEADERS_REFERRER_POLICY_MISSING"));
    }

    if let Ok(None) = &results.permissions_policy {
        debug!("Permissions-Policy header missing.");
        analyses.push(finding("HEADERS_PERMISSIONS_POLICY_MISSING"));
    }

    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Severity;
    use reqwest::header::{HeaderName, HeaderValue};

    fn present(value: &str) -> ScanResult<HeaderData> {
        Ok(Some(HeaderData { value: value.to_string() }))
    }

    #[test]
    fn all_headers_missing_produces_six_findings() {
        let results = HeadersResults::default();
        let analyses = analyze_headers_results(&results);
        assert_eq!(analyses.len(), 6);
        assert!(analyses.iter().any(|a| a.code == "HEADERS_HSTS_MISSING" && a.severity == Severity::Critical));
        assert!(analyses.iter().any(|a| a.code == "HEADERS_PERMISSIONS_POLICY_MISSING" && a.severity == Severity::Medium));
    }

    #[test]
    fn fully_hardened_response_yields_no_findings() {
        let results = HeadersResults {
            hsts: present("max-age=31536000; includeSubDomains"),
            csp: present("default-src 'self'"),
            x_frame_options: present("DENY"),
            x_content_type_options: present("nosniff"),
            referrer_policy: present("no-referrer"),
            permissions_policy: present("geolocation=()"),
            error: None,
            analysis: Vec::new(),
        };
        assert!(analyze_headers_results(&results).is_empty());
    }

    #[test]
    fn request_error_collapses_to_single_critical_finding() {
        let results = degraded_headers_results("connection refused");
        assert_eq!(results.analysis.len(), 1);
        assert_eq!(results.analysis[0].code, "HEADERS_REQUEST_FAILED");
        assert_eq!(results.analysis[0].severity, Severity::Critical);
    }

    #[test]
    fn non_utf8_header_value_is_reported_present() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        let checked = check_header(&headers, "x-frame-options");
        assert_eq!(checked.unwrap().unwrap().value, "[Invalid UTF-8]");
    }
}
