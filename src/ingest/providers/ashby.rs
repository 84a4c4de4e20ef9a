// src/ingest/providers/ashby.rs
//! Ashby posting API. Postings carry an explicit `isRemote` flag and a full
//! `descriptionHtml`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::providers::parse_rfc3339_to_unix;
use crate::ingest::types::{JobAdapter, ProviderKind, ScrapedJob};
use crate::ingest::{detect_remote, extract_requirements, extract_tech_stack, normalize_text};

#[derive(Debug, Deserialize)]
struct BoardResponse {
    jobs: Vec<BoardJob>,
}

#[derive(Debug, Deserialize)]
struct BoardJob {
    title: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, rename = "descriptionHtml")]
    description_html: Option<String>,
    #[serde(default, rename = "jobUrl")]
    job_url: Option<String>,
    #[serde(default, rename = "isRemote")]
    is_remote: Option<bool>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

pub struct AshbyAdapter {
    company: String,
    board_name: String,
    client: reqwest::Client,
}

impl AshbyAdapter {
    pub fn new(company: &str, board_name: String, client: reqwest::Client) -> Self {
        Self {
            company: company.to_string(),
            board_name,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.ashbyhq.com/posting-api/job-board/{}?includeCompensation=true",
            self.board_name
        )
    }

    async fn fetch(&self) -> Result<Vec<ScrapedJob>> {
        let resp = self
            .client
            .get(self.endpoint())
            .send()
            .await
            .context("ashby http get")?
            .error_for_status()
            .context("ashby http status")?;
        let body = resp.text().await.context("ashby http body")?;
        parse_board(&body, &self.company)
    }
}

/// Parse one job-board payload. Pure; fixture tests call this directly.
pub fn parse_board(body: &str, company: &str) -> Result<Vec<ScrapedJob>> {
    let t0 = std::time::Instant::now();
    let parsed: BoardResponse = serde_json::from_str(body).context("parsing ashby json")?;

    let mut out = Vec::with_capacity(parsed.jobs.len());
    for job in parsed.jobs {
        let title = normalize_text(&job.title);
        if title.is_empty() {
            continue;
        }
        let description = normalize_text(job.description_html.as_deref().unwrap_or_default());
        let location = job
            .location
            .map(|l| normalize_text(&l))
            .unwrap_or_default();

        out.push(ScrapedJob {
            company: company.to_string(),
            title,
            url: job.job_url.unwrap_or_default(),
            requirements: extract_requirements(&description),
            tech_stack: extract_tech_stack(&description),
            remote: job.is_remote.unwrap_or(false) || detect_remote(&location, &description),
            location,
            posted_at: job.published_at.as_deref().and_then(parse_rfc3339_to_unix),
            description,
        });
    }

    histogram!("scrape_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("scrape_jobs_scraped_total").increment(out.len() as u64);
    Ok(out)
}

#[async_trait]
impl JobAdapter for AshbyAdapter {
    async fn scrape(&self) -> Vec<ScrapedJob> {
        match self.fetch().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    company = %self.company,
                    provider = "ashby",
                    "provider error"
                );
                counter!("scrape_provider_errors_total").increment(1);
                Vec::new()
            }
        }
    }

    fn company(&self) -> &str {
        &self.company
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Ashby
    }
}
