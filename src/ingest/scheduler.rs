// src/ingest/scheduler.rs
use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::run_pass;
use crate::ingest::types::Company;
use crate::store::JobStore;

#[derive(Clone, Copy, Debug)]
pub struct PollSchedulerCfg {
    pub interval_secs: u64,
    pub expiry_threshold: u32,
}

/// Spawn the background polling loop. One loop means passes are serialized by
/// construction; a pass never overlaps the next one.
pub fn spawn_poll_scheduler(
    cfg: PollSchedulerCfg,
    companies: Arc<Vec<Company>>,
    store: Arc<dyn JobStore>,
    http: reqwest::Client,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs.max(1)));
        loop {
            ticker.tick().await;

            let summary =
                run_pass(&companies, store.as_ref(), &http, cfg.expiry_threshold).await;

            counter!("scrape_runs_total").increment(1);

            tracing::info!(
                target: "ingest",
                companies = summary.companies_scraped,
                skipped = summary.companies_skipped,
                scraped = summary.jobs_scraped,
                new = summary.new_jobs.len(),
                resighted = summary.resighted,
                expired = summary.expired.len(),
                "poll pass complete"
            );
        }
    })
}
