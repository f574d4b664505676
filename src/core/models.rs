// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

// --- Reusable Result Types ---
// A sub-check lookup that can succeed with data, succeed with nothing found,
// or fail with a transport-level error message.
pub type ScanResult<T> = Result<Option<T>, String>;

// --- Core Data Models ---

/// Severity of a single security finding. Every finding is counted in
/// exactly one of the three buckets reported by a website scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

/// An analysis finding: a severity plus a machine-readable code that keys
/// into the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFinding {
    pub severity: Severity,
    pub code: String,
}

impl AnalysisFinding {
    pub fn new(severity: Severity, code: &str) -> Self {
        Self { severity, code: code.to_string() }
    }
}

/// Categorical risk label derived from a continuous score via fixed
/// thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Level for a phishing probability in [0, 1].
    pub fn from_phishing_score(score: f64) -> Self {
        if score >= 0.85 {
            RiskLevel::Critical
        } else if score >= 0.7 {
            RiskLevel::High
        } else if score >= 0.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Level for an aggregate website risk score (0 best, 100 worst).
    pub fn from_risk_points(points: u32) -> Self {
        match points {
            80..=u32::MAX => RiskLevel::Critical,
            60..=79 => RiskLevel::High,
            40..=59 => RiskLevel::Medium,
            20..=39 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        }
    }

    /// Level for an email found in `count` known breaches.
    pub fn from_breach_count(count: usize) -> Self {
        match count {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            2..=3 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

/// Letter-scale summary of one scan dimension or of a whole scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade for a dimension score where 100 is best.
    pub fn from_score(score: u32) -> Self {
        match score {
            95..=u32::MAX => Grade::A,
            85..=94 => Grade::B,
            70..=84 => Grade::C,
            50..=69 => Grade::D,
            _ => Grade::F,
        }
    }

    /// Grade for an aggregate risk score where 0 is best.
    pub fn from_risk_points(points: u32) -> Self {
        match points {
            0..=10 => Grade::A,
            11..=25 => Grade::B,
            26..=45 => Grade::C,
            46..=70 => Grade::D,
            _ => Grade::F,
        }
    }
}

// --- DNS Scanner Models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpfData {
    pub record: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmarcData {
    pub record: String,
    pub policy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DkimRecord {
    pub selector: String,
    pub record: String,
}

/// Aggregated results of the DNS sub-check: SPF, DMARC, DKIM, and CAA
/// records plus the findings derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsResults {
    pub spf: ScanResult<SpfData>,
    pub dmarc: ScanResult<DmarcData>,
    pub dkim: ScanResult<Vec<DkimRecord>>,
    pub caa: ScanResult<Vec<String>>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for DnsResults {
    fn default() -> Self {
        Self {
            spf: Ok(None),
            dmarc: Ok(None),
            dkim: Ok(None),
            caa: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- SSL/TLS Scanner Models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub subject_name: String,
    pub issuer_name: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub days_until_expiry: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslData {
    pub is_valid: bool,
    pub certificate_info: CertificateInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslResults {
    pub scan: ScanResult<SslData>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for SslResults {
    fn default() -> Self {
        Self {
            scan: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- HTTP Header Scanner Models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderData {
    pub value: String,
}

/// Aggregated results of the HTTP security-header sub-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadersResults {
    pub hsts: ScanResult<HeaderData>,
    pub csp: ScanResult<HeaderData>,
    pub x_frame_options: ScanResult<HeaderData>,
    pub x_content_type_options: ScanResult<HeaderData>,
    pub referrer_policy: ScanResult<HeaderData>,
    pub permissions_policy: ScanResult<HeaderData>,
    pub error: Option<String>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for HeadersResults {
    fn default() -> Self {
        Self {
            hsts: Ok(None),
            csp: Ok(None),
            x_frame_options: Ok(None),
            x_content_type_options: Ok(None),
            referrer_policy: Ok(None),
            permissions_policy: Ok(None),
            error: None,
            analysis: Vec::new(),
        }
    }
}

// --- Raw Scan Report ---

/// Raw output of the three concurrent sub-checks, before grading.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanReport {
    pub dns_results: DnsResults,
    pub ssl_results: SslResults,
    pub headers_results: HeadersResults,
}

impl ScanReport {
    /// All findings across the three dimensions.
    pub fn findings(&self) -> impl Iterator<Item = &AnalysisFinding> {
        self.headers_results
            .analysis
            .iter()
            .chain(self.ssl_results.analysis.iter())
            .chain(self.dns_results.analysis.iter())
    }
}

// --- Persisted Scan Record ---

/// One completed website scan. Immutable once appended to history.
///
/// `risk_score` runs 0 (best) to 100 (worst). The issue counts always sum
/// to the length of `recommendations`: every recommendation is derived
/// from exactly one counted finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub scan_id: Uuid,
    pub url: String,
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
    pub scan_duration_ms: u64,
    pub scanned_at: DateTime<Utc>,
}

// --- Scan Progress Models ---

/// Lifecycle state of a scan as exposed by the progress endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ScanState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanState::Completed | ScanState::Failed)
    }
}

/// Transient progress snapshot for one scan, keyed by its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub scan_id: Uuid,
    pub url: String,
    pub state: ScanState,
    pub current_phase: String,
    pub progress_percentage: u8,
    pub started_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phishing_score_thresholds() {
        assert_eq!(RiskLevel::from_phishing_score(0.1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_phishing_score(0.5), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_phishing_score(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::from_phishing_score(0.85), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_phishing_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn risk_points_map_to_levels_and_grades() {
        assert_eq!(RiskLevel::from_risk_points(0), RiskLevel::Minimal);
        assert_eq!(RiskLevel::from_risk_points(45), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_risk_points(95), RiskLevel::Critical);
        assert_eq!(Grade::from_risk_points(5), Grade::A);
        assert_eq!(Grade::from_risk_points(30), Grade::C);
        assert_eq!(Grade::from_risk_points(90), Grade::F);
    }

    #[test]
    fn dimension_scores_map_to_grades() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(85), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::C);
        assert_eq!(Grade::from_score(50), Grade::D);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn breach_count_thresholds() {
        assert_eq!(RiskLevel::from_breach_count(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_breach_count(1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_breach_count(3), RiskLevel::High);
        assert_eq!(RiskLevel::from_breach_count(4), RiskLevel::Critical);
    }
}
