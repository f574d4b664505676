mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{build_test_context, expect_json, get, post_json};
use cyberguardx::core::models::{Grade, RiskLevel, ScanRecord};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn health_reports_project_and_status() {
    let ctx = build_test_context();
    let body = expect_json(get(&ctx, "/").await, StatusCode::OK).await;
    assert_eq!(body["project"], "CyberGuardX");
    assert_eq!(body["status"], "running");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn check_url_scores_trusted_url_below_impersonation_url() {
    let ctx = build_test_context();

    let clean = expect_json(
        post_json(&ctx, "/check-url", json!({"url": "https://www.google.com"})).await,
        StatusCode::OK,
    )
    .await;
    let shady = expect_json(
        post_json(
            &ctx,
            "/check-url",
            json!({"url": "http://paypal-verify-security-check.com"}),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    let clean_score = clean["phishing_score"].as_f64().unwrap();
    let shady_score = shady["phishing_score"].as_f64().unwrap();

    assert!((0.0..=1.0).contains(&clean_score));
    assert!((0.0..=1.0).contains(&shady_score));
    assert!(clean_score < shady_score);

    assert_eq!(clean["is_phishing"], false);
    assert_eq!(clean["risk_level"], "LOW");
    assert_eq!(shady["is_phishing"], true);
    assert!(shady_score >= 0.7, "expected HIGH-range score, got {}", shady_score);
    assert_eq!(shady["risk_level"], "HIGH");

    // Explainability contract: model identity plus ranked feature analysis.
    assert_eq!(shady["model_info"]["name"], "Logistic Regression");
    assert!(shady["model_info"]["version"].is_string());
    let analysis = shady["feature_analysis"].as_array().unwrap();
    assert!(!analysis.is_empty() && analysis.len() <= 5);
    for entry in analysis {
        assert!(entry["feature"].is_string());
        assert!(entry["risk"].is_string());
    }
    assert!(!shady["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn check_url_rejects_malformed_url() {
    let ctx = build_test_context();
    let body = expect_json(
        post_json(&ctx, "/check-url", json!({"url": "not a url"})).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn check_email_reports_breached_and_clean_addresses() {
    let ctx = build_test_context();

    let breached = expect_json(
        post_json(&ctx, "/check-email", json!({"email": "breached@example.com"})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(breached["breached"], true);
    assert_eq!(breached["pwned_count"], 1);
    assert_eq!(breached["risk_level"], "MEDIUM");
    assert_eq!(breached["breaches"][0]["name"], "AcmeLeak");

    let clean = expect_json(
        post_json(&ctx, "/check-email", json!({"email": "clean@example.com"})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(clean["breached"], false);
    assert_eq!(clean["risk_level"], "LOW");
    assert!(!clean["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn check_email_rejects_malformed_address() {
    let ctx = build_test_context();
    let body = expect_json(
        post_json(&ctx, "/check-email", json!({"email": "not-an-email"})).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn scan_website_without_permission_flags_is_refused_and_leaves_no_history() {
    let ctx = build_test_context();

    // Each missing flag on its own must refuse the scan.
    for flags in [
        json!({"confirmed_permission": false, "owner_confirmation": true, "legal_responsibility": true}),
        json!({"confirmed_permission": true, "owner_confirmation": false, "legal_responsibility": true}),
        json!({"confirmed_permission": true, "owner_confirmation": true, "legal_responsibility": false}),
    ] {
        let mut payload = flags;
        payload["url"] = json!("https://example.com");
        let body = expect_json(
            post_json(&ctx, "/scan-website", payload).await,
            StatusCode::FORBIDDEN,
        )
        .await;
        assert_eq!(body["error"], "not_authorized");
    }

    let history = expect_json(get(&ctx, "/scan-history").await, StatusCode::OK).await;
    assert_eq!(history.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn scan_website_rejects_malformed_url() {
    let ctx = build_test_context();
    let body = expect_json(
        post_json(
            &ctx,
            "/scan-website",
            json!({
                "url": "definitely not a url",
                "confirmed_permission": true,
                "owner_confirmation": true,
                "legal_responsibility": true
            }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn unknown_scan_id_yields_not_found_not_server_error() {
    let ctx = build_test_context();
    let body = expect_json(
        get(&ctx, "/scan-progress/99999999-9999-9999-9999-999999999999").await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn progress_snapshot_is_idempotent_once_terminal() {
    let ctx = build_test_context();
    let scan_id = ctx.state.tracker.create("https://example.com");
    ctx.state.tracker.advance(scan_id, "headers check complete", 35);
    ctx.state.tracker.complete(scan_id);

    let first = expect_json(
        get(&ctx, &format!("/scan-progress/{}", scan_id)).await,
        StatusCode::OK,
    )
    .await;
    let second = expect_json(
        get(&ctx, &format!("/scan-progress/{}", scan_id)).await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(first["state"], "COMPLETED");
    assert_eq!(first["progress_percentage"], 100);
    assert_eq!(first, second);
}

#[tokio::test]
async fn scan_history_returns_records_newest_first() {
    let ctx = build_test_context();

    let record = |url: &str| ScanRecord {
        scan_id: Uuid::new_v4(),
        url: url.to_string(),
        overall_grade: Grade::C,
        risk_score: 32,
        risk_level: RiskLevel::Low,
        http_grade: Grade::D,
        ssl_grade: Grade::A,
        dns_grade: Grade::C,
        critical_issues_count: 1,
        high_issues_count: 1,
        medium_issues_count: 1,
        recommendations: vec![
            "[HTTP] HSTS Header Missing: add it".to_string(),
            "[SSL] SSL Certificate Expiring Soon: renew".to_string(),
            "[DNS] CAA Record Missing: add one".to_string(),
        ],
        scan_duration_ms: 800,
        scanned_at: Utc::now(),
    };

    ctx.state.history.append(record("https://older.example"));
    ctx.state.history.append(record("https://newer.example"));

    let history = expect_json(get(&ctx, "/scan-history").await, StatusCode::OK).await;
    let items = history.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["url"], "https://newer.example");
    assert_eq!(items[1]["url"], "https://older.example");

    // Issue counts line up with the recommendation list.
    let counted = items[0]["critical_issues_count"].as_u64().unwrap()
        + items[0]["high_issues_count"].as_u64().unwrap()
        + items[0]["medium_issues_count"].as_u64().unwrap();
    assert_eq!(counted, items[0]["recommendations"].as_array().unwrap().len() as u64);

    let limited = expect_json(get(&ctx, "/scan-history?limit=1").await, StatusCode::OK).await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}
