// src/core/breach.rs

use crate::core::models::RiskLevel;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Basic lexical validation of an email address.
pub fn validate_email(email: &str) -> Result<(), String> {
    if RE_EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(format!("Invalid email address: '{}'", email))
    }
}

/// A single known breach an address appeared in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreachDetail {
    pub name: String,
    pub date: String,
    pub accounts: u64,
    pub data_classes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DatasetEntry {
    email: String,
    breaches: Vec<BreachDetail>,
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    entries: Vec<DatasetEntry>,
}

/// Result of one breach lookup. Built per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct BreachReport {
    pub breached: bool,
    pub pwned_count: usize,
    pub breaches: Vec<BreachDetail>,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
    pub message: String,
}

/// Offline email-breach lookup over a JSON dataset loaded at startup.
pub struct BreachChecker {
    entries: HashMap<String, Vec<BreachDetail>>,
}

impl BreachChecker {
    /// Loads the dataset from disk. A missing or unreadable file degrades
    /// to an empty dataset so lookups keep working.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Breach dataset unavailable, lookups will report no breaches.");
                return Self { entries: HashMap::new() };
            }
        };
        match serde_json::from_str::<DatasetFile>(&raw) {
            Ok(dataset) => {
                let checker = Self::from_entries(
                    dataset
                        .entries
                        .into_iter()
                        .map(|e| (e.email, e.breaches)),
                );
                info!(count = checker.entries.len(), path = %path.display(), "Breach dataset loaded.");
                checker
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Breach dataset malformed, lookups will report no breaches.");
                Self { entries: HashMap::new() }
            }
        }
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<BreachDetail>)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(email, breaches)| (email.to_lowercase(), breaches))
                .collect(),
        }
    }

    /// Looks up an address and derives risk level and recommendations.
    pub fn check(&self, email: &str) -> BreachReport {
        let breaches = self
            .entries
            .get(&email.to_lowercase())
            .cloned()
            .unwrap_or_default();
        let count = breaches.len();
        let risk_level = RiskLevel::from_breach_count(count);

        let message = if count == 0 {
            "No breaches found in the offline breach dataset.".to_string()
        } else {
            format!(
                "Email found in {} known breach{}. Review the recommendations below.",
                count,
                if count == 1 { "" } else { "es" }
            )
        };

        BreachReport {
            breached: count > 0,
            pwned_count: count,
            recommendations: build_recommendations(&breaches),
            breaches,
            risk_level,
            message,
        }
    }
}

fn build_recommendations(breaches: &[BreachDetail]) -> Vec<String> {
    if breaches.is_empty() {
        return vec![
            "Your email appears safe in our dataset".to_string(),
            "Continue using unique passwords for different services".to_string(),
            "Enable two-factor authentication where available".to_string(),
        ];
    }

    let mut recs = vec![
        "URGENT: Change passwords immediately for all affected accounts".to_string(),
        "Enable two-factor authentication (2FA) on all services".to_string(),
        "Check for reused passwords across different accounts".to_string(),
        "Be extra cautious of phishing emails targeting these services".to_string(),
    ];

    // Escalate when financially sensitive data classes were exposed.
    let sensitive = ["credit", "social security", "ssn", "bank", "financial"];
    let has_sensitive = breaches.iter().any(|b| {
        b.data_classes
            .iter()
            .any(|dc| sensitive.iter().any(|kw| dc.to_lowercase().contains(kw)))
    });
    if has_sensitive {
        recs.push("CRITICAL: Monitor credit reports for suspicious activity".to_string());
        recs.push("Consider placing a fraud alert with credit bureaus".to_string());
    }

    if breaches.len() >= 3 {
        recs.push("Use a password manager to generate unique passwords".to_string());
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breach(name: &str, data_classes: &[&str]) -> BreachDetail {
        BreachDetail {
            name: name.to_string(),
            date: "2023-06-01".to_string(),
            accounts: 1_000_000,
            data_classes: data_classes.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn checker() -> BreachChecker {
        BreachChecker::from_entries([
            ("breached@example.com".to_string(), vec![breach("AcmeLeak", &["Email addresses", "Passwords"])]),
            (
                "wrecked@example.com".to_string(),
                vec![
                    breach("AcmeLeak", &["Email addresses"]),
                    breach("ShopSpill", &["Passwords"]),
                    breach("BankDump", &["Credit cards"]),
                    breach("ForumDump", &["Usernames"]),
                ],
            ),
        ])
    }

    #[test]
    fn validates_email_format() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a b@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn clean_address_reports_low_risk() {
        let report = checker().check("clean@example.com");
        assert!(!report.breached);
        assert_eq!(report.pwned_count, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(!report.recommendations.is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let report = checker().check("BREACHED@Example.COM");
        assert!(report.breached);
        assert_eq!(report.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn heavily_breached_address_escalates() {
        let report = checker().check("wrecked@example.com");
        assert_eq!(report.pwned_count, 4);
        assert_eq!(report.risk_level, RiskLevel::Critical);
        // Credit-card exposure adds the financial-monitoring advice.
        assert!(report.recommendations.iter().any(|r| r.contains("credit reports")));
    }

    #[test]
    fn missing_dataset_degrades_to_empty() {
        let checker = BreachChecker::load(Path::new("/nonexistent/breaches.json"));
        assert!(!checker.check("anyone@example.com").breached);
    }
}
