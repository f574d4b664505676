// src/core/scoring.rs

//! Turns a raw `ScanReport` into grades, an aggregate risk score, issue
//! counts, and ordered recommendations. All weights and thresholds live
//! here; the per-finding points come from the knowledge base.

use crate::core::knowledge_base::get_finding_detail;
use crate::core::models::{AnalysisFinding, Grade, RiskLevel, ScanReport, Severity};

/// Weighted importance of each scan dimension in the aggregate score.
/// TLS carries the most weight (transport encryption), then headers,
/// then DNS.
const WEIGHT_HTTP: f64 = 0.35;
const WEIGHT_SSL: f64 = 0.45;
const WEIGHT_DNS: f64 = 0.20;

/// Full assessment of one website scan.
#[derive(Debug, Clone)]
pub struct ScanAssessment {
    /// Aggregate risk score: 0 is best, 100 is worst.
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub overall_grade: Grade,
    pub http_grade: Grade,
    pub ssl_grade: Grade,
    pub dns_grade: Grade,
    pub critical_issues_count: usize,
    pub high_issues_count: usize,
    pub medium_issues_count: usize,
    /// One recommendation per counted finding, severity-descending.
    pub recommendations: Vec<String>,
}

/// Risk points accumulated by one dimension's findings, capped at 100.
fn dimension_risk_points(findings: &[AnalysisFinding]) -> u32 {
    findings
        .iter()
        .filter_map(|f| get_finding_detail(&f.code))
        .map(|d| d.risk_points)
        .sum::<u32>()
        .min(100)
}

/// Grade for a dimension from its accumulated risk points.
fn dimension_grade(points: u32) -> Grade {
    Grade::from_score(100 - points)
}

/// Assesses a raw scan report: grades each dimension, aggregates the
/// weighted risk score, counts issues per severity, and assembles the
/// recommendation list.
pub fn assess(report: &ScanReport) -> ScanAssessment {
    let http_points = dimension_risk_points(&report.headers_results.analysis);
    let ssl_points = dimension_risk_points(&report.ssl_results.analysis);
    let dns_points = dimension_risk_points(&report.dns_results.analysis);

    let weighted = http_points as f64 * WEIGHT_HTTP
        + ssl_points as f64 * WEIGHT_SSL
        + dns_points as f64 * WEIGHT_DNS;
    let risk_score = weighted.round() as u32;

    // Order findings severity-descending (Critical first), then by the
    // points they carry, so the recommendation list leads with what
    // matters most.
    let mut findings: Vec<&AnalysisFinding> = report.findings().collect();
    findings.sort_by_key(|f| {
        let points = get_finding_detail(&f.code).map(|d| d.risk_points).unwrap_or(0);
        (f.severity, std::cmp::Reverse(points))
    });

    let critical_issues_count = findings.iter().filter(|f| f.severity == Severity::Critical).count();
    let high_issues_count = findings.iter().filter(|f| f.severity == Severity::High).count();
    let medium_issues_count = findings.iter().filter(|f| f.severity == Severity::Medium).count();

    let recommendations = findings
        .iter()
        .filter_map(|f| get_finding_detail(&f.code))
        .map(|d| d.recommendation())
        .collect();

    ScanAssessment {
        risk_score,
        risk_level: RiskLevel::from_risk_points(risk_score),
        overall_grade: Grade::from_risk_points(risk_score),
        http_grade: dimension_grade(http_points),
        ssl_grade: dimension_grade(ssl_points),
        dns_grade: dimension_grade(dns_points),
        critical_issues_count,
        high_issues_count,
        medium_issues_count,
        recommendations,
    }
}
