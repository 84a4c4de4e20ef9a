// tests/api_http.rs
//
// End-to-end tests of the caller-facing router via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use job_radar::api::{create_router, AppState};
use job_radar::matching::domains::DomainRegistry;
use job_radar::matching::skills::SkillDictionary;
use job_radar::matching::{DynMatcher, KeywordMatcher};
use job_radar::store::{InMemoryJobStore, JobStore};

fn test_app() -> axum::Router {
    let registry = Arc::new(
        DomainRegistry::from_toml_str(job_radar::matching::domains::DEFAULT_DOMAINS_TOML)
            .expect("embedded registry"),
    );
    let dictionary = Arc::new(SkillDictionary::embedded());
    let matcher: DynMatcher = Arc::new(KeywordMatcher::new(registry.clone(), dictionary));
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());

    create_router(AppState {
        store,
        matcher,
        registry,
        companies: Arc::new(Vec::new()),
        http: reqwest::Client::new(),
        expiry_threshold: 3,
    })
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_answers_ok() {
    let resp = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn detect_domains_finds_backend() {
    let (status, body) = post_json(
        test_app(),
        "/domains/detect",
        json!({
            "title": "Senior Backend Engineer",
            "description": "Node.js, PostgreSQL, REST APIs"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let domains = body["domains"].as_array().unwrap();
    assert!(domains.iter().any(|d| d == "backend-engineering"));
}

#[tokio::test]
async fn match_domains_transferable_scores_60() {
    let (status, body) = post_json(
        test_app(),
        "/match/domains",
        json!({
            "cv_text": "",
            "user_domains": ["frontend-engineering"],
            "job_domains": ["backend-engineering"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 60);
    assert_eq!(body["transferable"][0], "backend-engineering");
}

#[tokio::test]
async fn match_domains_without_job_domains_is_neutral() {
    let (status, body) = post_json(
        test_app(),
        "/match/domains",
        json!({ "cv_text": "", "user_domains": [], "job_domains": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 70);
}

#[tokio::test]
async fn extract_skills_reports_confidence() {
    let (status, body) = post_json(
        test_app(),
        "/skills/extract",
        json!({ "text": "Rust, PostgreSQL, Docker, Kubernetes, AWS and Kafka in production." }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let skills = body["skills"].as_array().unwrap();
    assert!(skills.len() >= 6);
    assert_eq!(body["confidence"], "medium");
}

#[tokio::test]
async fn role_level_analysis_end_to_end() {
    let (status, body) = post_json(
        test_app(),
        "/role-level",
        json!({
            "title": "Senior Backend Engineer",
            "description": "You will own services end to end.",
            "cv_text": "Currently a Junior Developer at Globex."
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job_level"], "senior");
    assert_eq!(body["candidate_level"], "junior");
    assert_eq!(body["progression"], "step_up");
    assert_eq!(body["growth_score"], 95);
}

#[tokio::test]
async fn domains_listing_exposes_the_registry() {
    let (status, body) = get_json(test_app(), "/domains").await;
    assert_eq!(status, StatusCode::OK);
    let domains = body.as_array().unwrap();
    assert!(domains.len() >= 5);
    let backend = domains
        .iter()
        .find(|d| d["id"] == "backend-engineering")
        .expect("backend domain listed");
    assert_eq!(backend["name"], "Backend Engineering");
}

#[tokio::test]
async fn jobs_endpoint_supports_filters() {
    let (status, body) = get_json(test_app(), "/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = get_json(
        test_app(),
        "/jobs?status=new&remote=true&min_alignment=50&include_expired=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn scrape_with_empty_roster_returns_empty_pass() {
    let req = Request::builder()
        .method("POST")
        .uri("/scrape")
        .body(Body::empty())
        .unwrap();
    let resp = test_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["companies_scraped"], 0);
    assert_eq!(body["new_jobs"], json!([]));
}
