// src/api/url.rs

//! `POST /check-url` — phishing URL classification with feature-level
//! explainability.

use crate::api::ApiError;
use crate::core::classifier::ModelMetrics;
use crate::core::features::{explain_features, extract_url_features};
use crate::core::models::RiskLevel;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct UrlCheckRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl ModelInfo {
    fn new(name: &str, version: &str, metrics: &ModelMetrics) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            accuracy: metrics.accuracy,
            precision: metrics.precision,
            recall: metrics.recall,
            f1_score: metrics.f1_score,
        }
    }
}

/// Per-feature explainability detail, ranked by model impact.
#[derive(Debug, Serialize)]
pub struct FeatureAnalysis {
    pub feature: String,
    pub value: f64,
    pub impact: f64,
    pub risk: RiskLevel,
    pub explanation: String,
}

#[derive(Debug, Serialize)]
pub struct UrlCheckResponse {
    pub url: String,
    pub is_phishing: bool,
    pub phishing_score: f64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub message: String,
    pub model_info: ModelInfo,
    pub feature_importance: HashMap<String, f64>,
    pub feature_analysis: Vec<FeatureAnalysis>,
    pub recommendations: Vec<String>,
}

pub async fn check_url(
    State(state): State<AppState>,
    Json(payload): Json<UrlCheckRequest>,
) -> Result<Json<UrlCheckResponse>, ApiError> {
    let features = extract_url_features(&payload.url).map_err(ApiError::InvalidInput)?;
    let classification = state.model.classify(features);

    info!(
        is_phishing = classification.is_phishing,
        score = classification.probability,
        "URL check completed."
    );

    // Rank explained features by the model's importance for each.
    let importance: HashMap<String, f64> = state
        .model
        .feature_importance()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

    let mut feature_analysis: Vec<FeatureAnalysis> = explain_features(&features)
        .into_iter()
        .map(|e| FeatureAnalysis {
            impact: importance.get(e.feature).copied().unwrap_or(0.0),
            feature: e.feature.to_string(),
            value: e.value,
            risk: e.risk,
            explanation: e.explanation,
        })
        .collect();
    feature_analysis
        .sort_by(|a, b| b.impact.partial_cmp(&a.impact).unwrap_or(std::cmp::Ordering::Equal));
    feature_analysis.truncate(5);

    let recommendations = build_recommendations(classification.is_phishing, &features);

    let message = if classification.is_phishing {
        format!(
            "High phishing probability ({:.1}%), confidence {:.1}%",
            classification.probability * 100.0,
            classification.confidence * 100.0
        )
    } else {
        format!(
            "Appears legitimate (phishing probability: {:.1}%, confidence: {:.1}%)",
            classification.probability * 100.0,
            classification.confidence * 100.0
        )
    };

    Ok(Json(UrlCheckResponse {
        url: payload.url,
        is_phishing: classification.is_phishing,
        phishing_score: classification.probability,
        confidence: classification.confidence,
        risk_level: classification.risk_level,
        message,
        model_info: ModelInfo::new(state.model.name(), state.model.version(), state.model.metrics()),
        feature_importance: importance,
        feature_analysis,
        recommendations,
    }))
}

fn build_recommendations(
    is_phishing: bool,
    features: &crate::core::features::UrlFeatures,
) -> Vec<String> {
    let mut recommendations = Vec::new();
    if is_phishing {
        recommendations.push(
            "This URL shows multiple phishing indicators - do not click or enter credentials"
                .to_string(),
        );
        if !features.has_https {
            recommendations
                .push("Missing HTTPS encryption - legitimate sites use HTTPS".to_string());
        }
        if !features.domain_age {
            recommendations
                .push("New or unknown domain - verify legitimacy before visiting".to_string());
        }
        if features.has_at {
            recommendations
                .push("Contains @ symbol - often used to disguise real destination".to_string());
        }
        if features.num_hyphens >= 2.0 {
            recommendations
                .push("Multiple hyphens in domain - possible brand impersonation".to_string());
        }
        recommendations.push("Verify the URL matches the official website".to_string());
        recommendations.push("Check for spelling errors in the domain name".to_string());
    } else {
        recommendations.push("URL appears legitimate based on analysis".to_string());
        recommendations.push("Always verify sender before clicking links in emails".to_string());
        recommendations.push("Look for HTTPS and valid SSL certificates".to_string());
    }
    recommendations
}
