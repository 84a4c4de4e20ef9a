//! job-radar — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the job store, matcher, company roster,
//! metrics, and the background polling scheduler.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_radar::api::{create_router, AppState};
use job_radar::config::{load_companies_default, ServiceConfig};
use job_radar::ingest::scheduler::{spawn_poll_scheduler, PollSchedulerCfg};
use job_radar::matching::domains::DomainRegistry;
use job_radar::matching::skills::SkillDictionary;
use job_radar::matching::{DynMatcher, KeywordMatcher};
use job_radar::metrics::Metrics;
use job_radar::store::{InMemoryJobStore, JobStore};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_radar=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = ServiceConfig::from_env();
    let metrics = Metrics::init(&cfg);

    // Static registries: loaded once, immutable afterwards, shared by Arc.
    let registry = Arc::new(DomainRegistry::load_default()?);
    let dictionary = Arc::new(SkillDictionary::embedded());
    let matcher: DynMatcher = Arc::new(KeywordMatcher::new(registry.clone(), dictionary));

    let companies = Arc::new(load_companies_default()?);
    tracing::info!(companies = companies.len(), "company roster loaded");

    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());

    // Shared client with connect/request timeouts so a hanging provider
    // cannot stall a pass indefinitely.
    let http = reqwest::Client::builder()
        .user_agent("job-radar/0.1 (+github.com/job-radar/job-radar)")
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(20))
        .build()?;

    // Detached on purpose: the handle only matters for tests.
    let _poller = spawn_poll_scheduler(
        PollSchedulerCfg {
            interval_secs: cfg.poll_interval_secs,
            expiry_threshold: cfg.expiry_threshold,
        },
        companies.clone(),
        store.clone(),
        http.clone(),
    );

    let state = AppState {
        store,
        matcher,
        registry,
        companies,
        http,
        expiry_threshold: cfg.expiry_threshold,
    };
    let router = create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
