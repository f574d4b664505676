// src/core/classifier.rs

use crate::core::features::{FEATURE_NAMES, UrlFeatures};
use crate::core::models::RiskLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Expected sign of each feature's weight, in `FEATURE_NAMES` order.
/// `true` marks a risk-increasing feature (weight must be >= 0); `false`
/// marks a protective one (weight must be <= 0). Enforcing this at load
/// time makes the classifier monotonic: raising a risky feature's value
/// can never lower the predicted probability.
const RISK_INCREASING: [bool; 10] = [
    true,  // url_length
    true,  // num_dots
    true,  // num_hyphens
    true,  // num_digits
    true,  // has_at
    false, // has_https
    false, // domain_age
    false, // ssl_valid
    true,  // path_length
    true,  // special_char_ratio
];

/// Failure to load or validate the model artifact. This is a cold-start
/// condition: the server refuses to boot without a usable model.
#[derive(Debug)]
pub enum ModelError {
    Unreadable(String),
    Malformed(String),
    MissingWeight(String),
    SignViolation(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Unreadable(e) => write!(f, "model artifact unreadable: {}", e),
            ModelError::Malformed(e) => write!(f, "model artifact malformed: {}", e),
            ModelError::MissingWeight(name) => {
                write!(f, "model artifact missing weight for feature '{}'", name)
            }
            ModelError::SignViolation(name) => write!(
                f,
                "weight for feature '{}' violates the monotonicity contract",
                name
            ),
        }
    }
}

impl std::error::Error for ModelError {}

/// Training metrics carried by the artifact for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    name: String,
    version: String,
    bias: f64,
    weights: HashMap<String, f64>,
    metrics: ModelMetrics,
}

/// Output of a single classification.
#[derive(Debug, Clone)]
pub struct Classification {
    pub probability: f64,
    pub confidence: f64,
    pub is_phishing: bool,
    pub risk_level: RiskLevel,
}

/// Logistic phishing classifier over the lexical feature vector.
///
/// The model is a weights-plus-bias artifact loaded once at startup, the
/// same load-from-disk pattern as the rest of the data-driven tables.
pub struct PhishingModel {
    name: String,
    version: String,
    bias: f64,
    weights: [f64; 10],
    metrics: ModelMetrics,
}

impl PhishingModel {
    /// Loads and validates the model artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Unreadable(format!("{}: {}", path.display(), e)))?;
        let model = Self::from_json(&raw)?;
        info!(model = %model.name, version = %model.version, path = %path.display(), "Phishing model loaded.");
        Ok(model)
    }

    /// Parses and validates an artifact from its JSON text.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact =
            serde_json::from_str(raw).map_err(|e| ModelError::Malformed(e.to_string()))?;

        let mut weights = [0.0; 10];
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let w = *artifact
                .weights
                .get(*name)
                .ok_or_else(|| ModelError::MissingWeight(name.to_string()))?;
            let sign_ok = if RISK_INCREASING[i] { w >= 0.0 } else { w <= 0.0 };
            if !sign_ok {
                return Err(ModelError::SignViolation(name.to_string()));
            }
            weights[i] = w;
        }

        Ok(Self {
            name: artifact.name,
            version: artifact.version,
            bias: artifact.bias,
            weights,
            metrics: artifact.metrics,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.metrics
    }

    /// Phishing probability in [0, 1] for an extracted feature set.
    pub fn predict(&self, features: UrlFeatures) -> f64 {
        let x = features.to_array();
        let z: f64 = self
            .weights
            .iter()
            .zip(x.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.bias;
        1.0 / (1.0 + (-z).exp())
    }

    /// Full classification: probability, confidence, verdict, risk level.
    pub fn classify(&self, features: UrlFeatures) -> Classification {
        let probability = self.predict(features);
        Classification {
            probability,
            confidence: (probability - 0.5).abs() * 2.0,
            is_phishing: probability >= 0.5,
            risk_level: RiskLevel::from_phishing_score(probability),
        }
    }

    /// Normalized absolute weights, the model's per-feature importance.
    pub fn feature_importance(&self) -> Vec<(&'static str, f64)> {
        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        let mut importance: Vec<(&'static str, f64)> = FEATURE_NAMES
            .iter()
            .zip(self.weights.iter())
            .map(|(name, w)| (*name, if total > 0.0 { w.abs() / total } else { 0.0 }))
            .collect();
        importance.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        importance
    }
}
