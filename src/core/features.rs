// src/core/features.rs

use crate::core::models::RiskLevel;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

/// Ordered names of the lexical features, matching the model artifact's
/// weight vector and the `feature_analysis` wire contract.
pub const FEATURE_NAMES: [&str; 10] = [
    "url_length",
    "num_dots",
    "num_hyphens",
    "num_digits",
    "has_at",
    "has_https",
    "domain_age",
    "ssl_valid",
    "path_length",
    "special_char_ratio",
];

/// Established domains treated as trusted for the simulated domain-age check.
const OLD_TRUSTED_DOMAINS: &[&str] = &[
    "google.com", "facebook.com", "amazon.com", "microsoft.com", "apple.com",
    "wikipedia.org", "github.com", "stackoverflow.com", "linkedin.com", "twitter.com",
    "instagram.com", "youtube.com", "reddit.com", "ebay.com", "netflix.com",
    "paypal.com", "adobe.com", "dropbox.com", "yahoo.com", "bing.com",
];

// Characters outside the set commonly seen in benign URLs.
static RE_SPECIAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9/.\-_:]").expect("valid special-char regex"));

/// Fixed set of lexical features extracted from a URL.
///
/// Extraction is pure and deterministic: no network access, so the
/// extractor can be tested independently of the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrlFeatures {
    pub url_length: f64,
    pub num_dots: f64,
    pub num_hyphens: f64,
    pub num_digits: f64,
    pub has_at: bool,
    pub has_https: bool,
    pub domain_age: bool,
    pub ssl_valid: bool,
    pub path_length: f64,
    pub special_char_ratio: f64,
}

impl UrlFeatures {
    /// Feature values in the fixed model-input order.
    pub fn to_array(self) -> [f64; 10] {
        [
            self.url_length,
            self.num_dots,
            self.num_hyphens,
            self.num_digits,
            self.has_at as u8 as f64,
            self.has_https as u8 as f64,
            self.domain_age as u8 as f64,
            self.ssl_valid as u8 as f64,
            self.path_length,
            self.special_char_ratio,
        ]
    }
}

/// Extracts the lexical feature set from a URL string.
///
/// Fails when the URL cannot be parsed into a scheme and host, which the
/// API layer surfaces as invalid input.
pub fn extract_url_features(url: &str) -> Result<UrlFeatures, String> {
    let parsed = Url::parse(url).map_err(|e| format!("Invalid URL: {}", e))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| "Invalid URL: missing host".to_string())?;

    let has_https = parsed.scheme() == "https";

    // Simulated domain-age check against the trusted-domain table.
    let domain = host.to_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    let domain_age = OLD_TRUSTED_DOMAINS.contains(&domain);

    let special_count = RE_SPECIAL_CHARS.find_iter(url).count();
    let special_char_ratio = if url.is_empty() {
        0.0
    } else {
        special_count as f64 / url.len() as f64
    };

    // A bare "/" path carries no information; count it as empty.
    let path = parsed.path();
    let path_length = if path == "/" { 0.0 } else { path.len() as f64 };

    Ok(UrlFeatures {
        url_length: url.len() as f64,
        num_dots: url.matches('.').count() as f64,
        num_hyphens: url.matches('-').count() as f64,
        num_digits: url.chars().filter(|c| c.is_ascii_digit()).count() as f64,
        has_at: url.contains('@'),
        has_https,
        domain_age,
        ssl_valid: has_https && domain_age,
        path_length,
        special_char_ratio,
    })
}

/// One feature's contribution to the explainability report.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureExplanation {
    pub feature: &'static str,
    pub value: f64,
    pub risk: RiskLevel,
    pub explanation: String,
}

/// Human-readable per-feature risk labels.
///
/// Only noteworthy features are explained; benign values for optional
/// indicators (no hyphens, no `@`) are omitted from the report.
pub fn explain_features(features: &UrlFeatures) -> Vec<FeatureExplanation> {
    let mut explanations = Vec::new();

    let (risk, explanation) = if features.url_length > 75.0 {
        (RiskLevel::High, "Unusually long URL - common in phishing to hide malicious intent")
    } else if features.url_length > 54.0 {
        (RiskLevel::Medium, "Longer than average URL - slightly suspicious")
    } else {
        (RiskLevel::Low, "Normal URL length")
    };
    explanations.push(FeatureExplanation {
        feature: "url_length",
        value: features.url_length,
        risk,
        explanation: explanation.to_string(),
    });

    if features.num_hyphens >= 3.0 {
        explanations.push(FeatureExplanation {
            feature: "num_hyphens",
            value: features.num_hyphens,
            risk: RiskLevel::High,
            explanation: "Multiple hyphens in domain - common phishing technique".to_string(),
        });
    } else if features.num_hyphens >= 1.0 {
        explanations.push(FeatureExplanation {
            feature: "num_hyphens",
            value: features.num_hyphens,
            risk: RiskLevel::Medium,
            explanation: "Hyphen present - monitor for brand impersonation".to_string(),
        });
    }

    if features.has_at {
        explanations.push(FeatureExplanation {
            feature: "has_at",
            value: 1.0,
            risk: RiskLevel::Critical,
            explanation: "Contains @ symbol - often used to trick users about actual domain"
                .to_string(),
        });
    }

    if !features.has_https {
        explanations.push(FeatureExplanation {
            feature: "has_https",
            value: 0.0,
            risk: RiskLevel::High,
            explanation: "No HTTPS encryption - data transmitted insecurely".to_string(),
        });
    }

    explanations.push(if features.domain_age {
        FeatureExplanation {
            feature: "domain_age",
            value: 1.0,
            risk: RiskLevel::Low,
            explanation: "Established trusted domain".to_string(),
        }
    } else {
        FeatureExplanation {
            feature: "domain_age",
            value: 0.0,
            risk: RiskLevel::High,
            explanation: "New or unknown domain - not in trusted domains list".to_string(),
        }
    });

    if !features.ssl_valid {
        explanations.push(FeatureExplanation {
            feature: "ssl_valid",
            value: 0.0,
            risk: RiskLevel::High,
            explanation: "No valid SSL certificate detected".to_string(),
        });
    }

    if features.path_length > 100.0 {
        explanations.push(FeatureExplanation {
            feature: "path_length",
            value: features.path_length,
            risk: RiskLevel::Medium,
            explanation: "Unusually long URL path - may be attempting obfuscation".to_string(),
        });
    }

    if features.special_char_ratio > 0.15 {
        explanations.push(FeatureExplanation {
            feature: "special_char_ratio",
            value: features.special_char_ratio,
            risk: RiskLevel::High,
            explanation: format!(
                "High special character ratio ({:.1}%) - possible obfuscation",
                features.special_char_ratio * 100.0
            ),
        });
    }

    explanations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_expected_values_for_trusted_https_url() {
        let f = extract_url_features("https://www.google.com").unwrap();
        assert_eq!(f.url_length, 22.0);
        assert_eq!(f.num_dots, 2.0);
        assert_eq!(f.num_hyphens, 0.0);
        assert_eq!(f.num_digits, 0.0);
        assert!(!f.has_at);
        assert!(f.has_https);
        assert!(f.domain_age);
        assert!(f.ssl_valid);
        assert_eq!(f.special_char_ratio, 0.0);
    }

    #[test]
    fn extracts_expected_values_for_suspicious_url() {
        let f = extract_url_features("http://paypal-verify-security-check.com").unwrap();
        assert_eq!(f.num_hyphens, 3.0);
        assert!(!f.has_https);
        assert!(!f.domain_age);
        assert!(!f.ssl_valid);
    }

    #[test]
    fn at_symbol_is_detected() {
        let f = extract_url_features("https://user@evil.example/login").unwrap();
        assert!(f.has_at);
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_url_features("https://example.com/a/b?x=1").unwrap();
        let b = extract_url_features("https://example.com/a/b?x=1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unparsable_url_is_rejected() {
        assert!(extract_url_features("not a url").is_err());
        assert!(extract_url_features("").is_err());
    }

    #[test]
    fn feature_array_order_matches_names() {
        let f = extract_url_features("https://www.google.com").unwrap();
        let arr = f.to_array();
        assert_eq!(arr.len(), FEATURE_NAMES.len());
        assert_eq!(arr[0], f.url_length);
        assert_eq!(arr[5], 1.0); // has_https
        assert_eq!(arr[6], 1.0); // domain_age
    }

    #[test]
    fn explanations_flag_missing_https_and_unknown_domain() {
        let f = extract_url_features("http://paypal-verify-security-check.com").unwrap();
        let explained = explain_features(&f);
        assert!(explained.iter().any(|e| e.feature == "has_https" && e.risk == RiskLevel::High));
        assert!(explained.iter().any(|e| e.feature == "domain_age" && e.risk == RiskLevel::High));
    }
}
