// src/ingest/providers/greenhouse.rs
//! Greenhouse job board API. The `content` field arrives HTML-escaped, so it
//! goes through entity decoding and tag stripping before anything else.

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
    absolute_url: String,
    #[serde(default)]
    location: Option<BoardLocation>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardLocation {
    name: String,
}

pub struct GreenhouseAdapter {
    company: String,
    board_token: String,
    client: reqwest::Client,
}

impl GreenhouseAdapter {
    pub fn new(company: &str, board_token: String, client: reqwest::Client) -> Self {
        Self {
            company: company.to_string(),
            board_token,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://boards-api.greenhouse.io/v1/boards/{}/jobs?content=true",
            self.board_token
        )
    }

    async fn fetch(&self) -> Result<Vec<ScrapedJob>> {
        let resp = self
            .client
            .get(self.endpoint())
            .send()
            .await
            .context("greenhouse http get")?
            .error_for_status()
            .context("greenhouse http status")?;
        let body = resp.text().await.context("greenhouse http body")?;
        parse_board(&body, &self.company)
    }
}

/// Parse one board payload. Pure; fixture tests call this directly.
pub fn parse_board(body: &str, company: &str) -> Result<Vec<ScrapedJob>> {
    let t0 = std::time::Instant::now();
    let parsed: BoardResponse =
        serde_json::from_str(body).context("parsing greenhouse board json")?;

    let mut out = Vec::with_capacity(parsed.jobs.len());
    for job in parsed.jobs {
        let title = normalize_text(&job.title);
        if title.is_empty() {
            continue;
        }
        let description = normalize_text(job.content.as_deref().unwrap_or_default());
        let location = job
            .location
            .map(|l| normalize_text(&l.name))
            .unwrap_or_default();

        out.push(ScrapedJob {
            company: company.to_string(),
            title,
            url: job.absolute_url,
            requirements: extract_requirements(&description),
            tech_stack: extract_tech_stack(&description),
            remote: detect_remote(&location, &description),
            location,
            posted_at: job.updated_at.as_deref().and_then(parse_rfc3339_to_unix),
            description,
        });
    }

    histogram!("scrape_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("scrape_jobs_scraped_total").increment(out.len() as u64);
    Ok(out)
}

#[async_trait]
impl JobAdapter for GreenhouseAdapter {
    async fn scrape(&self) -> Vec<ScrapedJob> {
        match self.fetch().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    company = %self.company,
                    provider = "greenhouse",
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
        ProviderKind::Greenhouse
    }
}
