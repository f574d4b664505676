#![allow(dead_code)]

use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use chrono::Utc;
use cyberguardx::api;
use cyberguardx::config::ServerConfig;
use cyberguardx::core::breach::{BreachChecker, BreachDetail};
use cyberguardx::core::classifier::PhishingModel;
use cyberguardx::core::history::InMemoryHistory;
use cyberguardx::core::progress::ProgressTracker;
use cyberguardx::state::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

const MODEL_JSON: &str = include_str!("../../models/phishing_model.json");

pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
}

pub fn build_test_context() -> TestContext {
    let model = Arc::new(PhishingModel::from_json(MODEL_JSON).expect("shipped model must load"));
    let breach_checker = Arc::new(BreachChecker::from_entries([
        (
            "breached@example.com".to_string(),
            vec![BreachDetail {
                name: "AcmeLeak".to_string(),
                date: "2021-03-14".to_string(),
                accounts: 8_200_000,
                data_classes: vec!["Email addresses".to_string(), "Passwords".to_string()],
            }],
        ),
    ]));

    let state = AppState {
        model,
        breach_checker,
        tracker: Arc::new(ProgressTracker::new()),
        history: Arc::new(InMemoryHistory::new()),
        config: Arc::new(ServerConfig::default()),
        start_time: Utc::now(),
    };
    let app = api::build_router(state.clone());
    TestContext { state, app }
}

pub async fn get(ctx: &TestContext, uri: &str) -> Response<Body> {
    ctx.app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds")
}

pub async fn post_json(ctx: &TestContext, uri: &str, body: Value) -> Response<Body> {
    ctx.app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("request succeeds")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    json_body(response).await
}
