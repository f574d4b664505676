// src/core/scanner/ssl_scanner.rs

use tracing::{debug, error, info};

use crate::core::knowledge_base::finding;
use crate::core::models::{AnalysisFinding, CertificateInfo, ScanResult, SslData, SslResults};
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tokio::task::spawn_blocking;
use x509_parser::prelude::*;

/// Runs the TLS/SSL sub-check: handshake with the target on port 443 and
/// analysis of the presented X.509 certificate.
///
/// The handshake uses blocking socket I/O, so it runs on a dedicated
/// blocking task. `connect_timeout` bounds the TCP connection attempt.
pub async fn run_ssl_scan(target: &str, connect_timeout: Duration) -> SslResults {
    info!(target, "Starting SSL/TLS scan.");
    let target_owned = target.to_string();

    debug!("Spawning blocking task for TLS connection.");
    let scan_result = spawn_blocking(move || perform_tls_scan(&target_owned, connect_timeout))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Blocking SSL scan task panicked!");
            Err(format!("Task panicked: {}", e))
        });

    debug!("SSL scan task finished, starting analysis.");
    let mut results = SslResults {
        scan: scan_result,
        analysis: Vec::new(),
    };

    results.analysis = analyze_ssl_results(&results);

    info!(findings = %results.analysis.len(), "SSL/TLS scan finished.");
    results
}

/// Degraded result used when the sub-check exceeds its overall timeout.
pub fn degraded_ssl_results(reason: &str) -> SslResults {
    SslResults {
        scan: Err(reason.to_string()),
        analysis: vec![finding("SSL_HANDSHAKE_FAILED")],
    }
}

fn perform_tls_scan(target: &str, connect_timeout: Duration) -> ScanResult<SslData> {
    debug!(target, "Performing TLS connection and handshake.");

    let connector = TlsConnector::new().map_err(|e| {
        error!(error = %e, "Failed to create TlsConnector");
        format!("TlsConnector Error: {}", e)
    })?;

    debug!(target, "Connecting TCP stream to port 443.");
    let addr = (target, 443)
        .to_socket_addrs()
        .map_err(|e| {
            error!(error = %e, "Address resolution failed");
            format!("Address Resolution Error: {}", e)
        })?
        .next()
        .ok_or_else(|| "Address Resolution Error: no addresses returned".to_string())?;
    let stream = TcpStream::connect_timeout(&addr, connect_timeout).map_err(|e| {
        error!(error = %e, "TCP connection failed");
        format!("TCP Connection Error: {}", e)
    })?;

    debug!(target, "Performing TLS handshake.");
    let stream = connector.connect(target, stream).map_err(|e| {
        error!(error = %e, "TLS handshake failed");
        format!("TLS Handshake Error: {}", e)
    })?;

    let cert = match stream.peer_certificate() {
        Ok(Some(c)) => {
            debug!("Peer certificate found.");
            c
        }
        Ok(None) => {
            debug!("TLS connection successful, but no peer certificate provided.");
            return Ok(None);
        }
        Err(e) => {
            error!(error = %e, "Failed to retrieve peer certificate from stream");
            return Err(format!("Could not get peer certificate: {}", e));
        }
    };

    let cert_der = cert.to_der().map_err(|e| {
        error!(error = %e, "Failed to convert certificate to DER format");
        format!("Could not convert certificate to DER: {}", e)
    })?;

    let (_, x509) = parse_x509_certificate(&cert_der).map_err(|e| {
        error!(error = %e, "Failed to parse X.509 certificate");
        format!("X.509 Parse Error: {}", e)
    })?;

    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");

    let validity = x509.validity();
    let not_after = asn1_time_to_chrono_utc(&validity.not_after);
    let not_before = asn1_time_to_chrono_utc(&validity.not_before);
    let days_until_expiry = not_after.signed_duration_since(Utc::now()).num_days();

    let is_valid = Utc::now() > not_before && Utc::now() < not_after;

    Ok(Some(SslData {
        is_valid,
        certificate_info: CertificateInfo {
            subject_name: x509.subject().to_string(),
            issuer_name: x509.issuer().to_string(),
            not_before,
            not_after,
            days_until_expiry,
        },
    }))
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

fn analyze_ssl_results(results: &SslResults) -> Vec<AnalysisFinding> {
    debug!("Analyzing SSL scan results.");
    let mut analyses = Vec::new();

    match &results.scan {
        Err(_) => {
            debug!("Scan failed, adding SSL_HANDSHAKE_FAILED finding.");
            analyses.push(finding("SSL_HANDSHAKE_FAILED"));
        }
        Ok(None) => {
            debug!("No certificate found, adding SSL_NO_CERTIFICATE_FOUND finding.");
            analyses.push(finding("SSL_NO_CERTIFICATE_FOUND"));
        }
        Ok(Some(ssl_data)) => {
            if !ssl_data.is_valid {
                debug!(expiry_date = %ssl_data.certificate_info.not_after, "Certificate is outside its validity window.");
                analyses.push(finding("SSL_EXPIRED"));
            }

            let days_left = ssl_data.certificate_info.days_until_expiry;
            if (0..=30).contains(&days_left) {
                debug!(days_left, "Certificate is expiring soon.");
                analyses.push(finding("SSL_EXPIRING_SOON"));
            }
        }
    }

    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Severity;
    use chrono::Duration as ChronoDuration;

    fn cert(days_until_expiry: i64, is_valid: bool) -> SslData {
        let now = Utc::now();
        SslData {
            is_valid,
            certificate_info: CertificateInfo {
                subject_name: "CN=example.com".to_string(),
                issuer_name: "CN=Test CA".to_string(),
                not_before: now - ChronoDuration::days(90),
                not_after: now + ChronoDuration::days(days_until_expiry),
                days_until_expiry,
            },
        }
    }

    #[test]
    fn handshake_failure_is_critical() {
        let results = SslResults { scan: Err("boom".to_string()), analysis: Vec::new() };
        let analyses = analyze_ssl_results(&results);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].code, "SSL_HANDSHAKE_FAILED");
        assert_eq!(analyses[0].severity, Severity::Critical);
    }

    #[test]
    fn missing_certificate_is_flagged() {
        let results = SslResults::default();
        let analyses = analyze_ssl_results(&results);
        assert_eq!(analyses[0].code, "SSL_NO_CERTIFICATE_FOUND");
    }

    #[test]
    fn expired_certificate_is_critical() {
        let results = SslResults {
            scan: Ok(Some(cert(-5, false))),
            analysis: Vec::new(),
        };
        let analyses = analyze_ssl_results(&results);
        let codes: Vec<&str> = analyses.iter().map(|a| a.code.as_str()).collect();
        assert!(codes.contains(&"SSL_EXPIRED"));
    }

    #[test]
    fn expiring_soon_is_flagged() {
        let results = SslResults {
            scan: Ok(Some(cert(10, true))),
            analysis: Vec::new(),
        };
        let analyses = analyze_ssl_results(&results);
        let codes: Vec<&str> = analyses.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["SSL_EXPIRING_SOON"]);
    }

    #[test]
    fn healthy_certificate_yields_no_findings() {
        let results = SslResults {
            scan: Ok(Some(cert(200, true))),
            analysis: Vec::new(),
        };
        assert!(analyze_ssl_results(&results).is_empty());
    }

    #[test]
    fn degraded_results_carry_worst_case_finding() {
        let results = degraded_ssl_results("timed out");
        assert_eq!(results.analysis.len(), 1);
        assert_eq!(results.analysis[0].code, "SSL_HANDSHAKE_FAILED");
    }
}
