use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::ingest::types::Company;
use crate::ingest::{run_pass, PassSummary};
use crate::matching::domains::DomainRegistry;
use crate::matching::skills::SkillExtraction;
use crate::matching::{AlignmentResult, DynMatcher};
use crate::matching::role_level::RoleLevelAnalysis;
use crate::store::{CanonicalJob, JobFilter, JobStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub matcher: DynMatcher,
    pub registry: Arc<DomainRegistry>,
    pub companies: Arc<Vec<Company>>,
    pub http: reqwest::Client,
    pub expiry_threshold: u32,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/scrape", post(scrape))
        .route("/jobs", get(get_jobs))
        .route("/domains", get(list_domains))
        .route("/domains/detect", post(detect_domains))
        .route("/match/domains", post(match_domains))
        .route("/skills/extract", post(extract_skills))
        .route("/role-level", post(role_level))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct ScrapeParams {
    #[serde(default)]
    company: Option<String>,
}

#[derive(Serialize)]
struct ScrapeResponse {
    companies_scraped: usize,
    companies_skipped: usize,
    jobs_scraped: usize,
    resighted: usize,
    expired: Vec<String>,
    new_jobs: Vec<CanonicalJob>,
}

/// Run one full aggregate -> dedup -> expiry pass and return the newly
/// inserted jobs. An optional company filter narrows the pass; expiry
/// bookkeeping stays scoped to the companies actually scraped.
async fn scrape(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Json<ScrapeResponse> {
    let companies: Vec<Company> = match params.company.as_deref() {
        Some(filter) => state
            .companies
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(filter))
            .cloned()
            .collect(),
        None => state.companies.as_ref().clone(),
    };

    let summary: PassSummary = run_pass(
        &companies,
        state.store.as_ref(),
        &state.http,
        state.expiry_threshold,
    )
    .await;

    let new_jobs = summary
        .new_jobs
        .iter()
        .filter_map(|id| state.store.get_job_by_identity(id))
        .collect();

    Json(ScrapeResponse {
        companies_scraped: summary.companies_scraped,
        companies_skipped: summary.companies_skipped,
        jobs_scraped: summary.jobs_scraped,
        resighted: summary.resighted,
        expired: summary.expired,
        new_jobs,
    })
}

async fn get_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> Json<Vec<CanonicalJob>> {
    Json(state.store.query_jobs(&filter))
}

#[derive(Serialize)]
struct DomainInfo {
    id: String,
    name: String,
    category: String,
    transferable_to: Vec<String>,
}

/// Registry listing so callers can present the declarable domains.
async fn list_domains(State(state): State<AppState>) -> Json<Vec<DomainInfo>> {
    Json(
        state
            .registry
            .domains()
            .iter()
            .map(|d| DomainInfo {
                id: d.id.clone(),
                name: d.name.clone(),
                category: d.category.clone(),
                transferable_to: d.transferable_to.clone(),
            })
            .collect(),
    )
}

#[derive(Deserialize)]
struct DetectDomainsReq {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Serialize)]
struct DetectDomainsResp {
    domains: Vec<String>,
}

async fn detect_domains(
    State(state): State<AppState>,
    Json(body): Json<DetectDomainsReq>,
) -> Json<DetectDomainsResp> {
    Json(DetectDomainsResp {
        domains: state.matcher.detect_job_domains(&body.title, &body.description),
    })
}

#[derive(Deserialize)]
struct MatchDomainsReq {
    #[serde(default)]
    cv_text: String,
    #[serde(default)]
    user_domains: Vec<String>,
    #[serde(default)]
    job_domains: Vec<String>,
}

async fn match_domains(
    State(state): State<AppState>,
    Json(body): Json<MatchDomainsReq>,
) -> Json<AlignmentResult> {
    Json(
        state
            .matcher
            .match_domains(&body.cv_text, &body.user_domains, &body.job_domains),
    )
}

#[derive(Deserialize)]
struct ExtractSkillsReq {
    text: String,
}

async fn extract_skills(
    State(state): State<AppState>,
    Json(body): Json<ExtractSkillsReq>,
) -> Json<SkillExtraction> {
    Json(state.matcher.extract_skills(&body.text))
}

#[derive(Deserialize)]
struct RoleLevelReq {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    cv_text: String,
}

async fn role_level(
    State(state): State<AppState>,
    Json(body): Json<RoleLevelReq>,
) -> Json<RoleLevelAnalysis> {
    Json(
        state
            .matcher
            .analyze_role_level(&body.title, &body.description, &body.cv_text),
    )
}
