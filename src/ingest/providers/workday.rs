// src/ingest/providers/workday.rs
//! Workday CXS job listing API. Only listing-level fields are available
//! without a per-posting follow-up, so descriptions are thinner here and the
//! requirements excerpt usually degrades to the prefix fallback.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::json;

use crate::ingest::providers::url_origin;
use crate::ingest::types::{JobAdapter, ProviderKind, ScrapedJob};
use crate::ingest::{detect_remote, extract_requirements, extract_tech_stack, normalize_text};

const PAGE_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, rename = "jobPostings")]
    job_postings: Vec<JobPosting>,
}

#[derive(Debug, Deserialize)]
struct JobPosting {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "externalPath")]
    external_path: Option<String>,
    #[serde(default, rename = "locationsText")]
    locations_text: Option<String>,
    #[serde(default, rename = "bulletFields")]
    bullet_fields: Vec<String>,
}

pub struct WorkdayAdapter {
    company: String,
    careers_url: String,
    tenant: String,
    site: String,
    client: reqwest::Client,
}

impl WorkdayAdapter {
    pub fn new(
        company: &str,
        careers_url: &str,
        tenant: String,
        site: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            company: company.to_string(),
            careers_url: careers_url.trim_end_matches('/').to_string(),
            tenant,
            site,
            client,
        }
    }

    fn endpoint(&self) -> Option<String> {
        let origin = url_origin(&self.careers_url)?;
        Some(format!(
            "{}/wday/cxs/{}/{}/jobs",
            origin, self.tenant, self.site
        ))
    }

    async fn fetch(&self) -> Result<Vec<ScrapedJob>> {
        let endpoint = self
            .endpoint()
            .context("workday careers_url has no usable origin")?;
        let body = json!({
            "limit": PAGE_LIMIT,
            "offset": 0,
            "searchText": "",
            "appliedFacets": {}
        });
        let resp = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .context("workday http post")?
            .error_for_status()
            .context("workday http status")?;
        let payload = resp.text().await.context("workday http body")?;
        parse_search(&payload, &self.company, &self.careers_url)
    }
}

/// Parse one CXS search payload. Pure; fixture tests call this directly.
pub fn parse_search(body: &str, company: &str, careers_url: &str) -> Result<Vec<ScrapedJob>> {
    let t0 = std::time::Instant::now();
    let parsed: SearchResponse = serde_json::from_str(body).context("parsing workday json")?;

    let base = careers_url.trim_end_matches('/');
    let mut out = Vec::with_capacity(parsed.job_postings.len());
    for posting in parsed.job_postings {
        let title = normalize_text(posting.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        let location = normalize_text(posting.locations_text.as_deref().unwrap_or_default());
        let mut description = title.clone();
        if !location.is_empty() {
            description.push_str(". ");
            description.push_str(&location);
        }
        for bullet in &posting.bullet_fields {
            description.push_str(". ");
            description.push_str(bullet);
        }
        let description = normalize_text(&description);

        let url = match posting.external_path.as_deref() {
            Some(path) if !path.is_empty() => format!("{}{}", base, path),
            _ => base.to_string(),
        };

        out.push(ScrapedJob {
            company: company.to_string(),
            title,
            url,
            requirements: extract_requirements(&description),
            tech_stack: extract_tech_stack(&description),
            remote: detect_remote(&location, &description),
            location,
            posted_at: None,
            description,
        });
    }

    histogram!("scrape_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("scrape_jobs_scraped_total").increment(out.len() as u64);
    Ok(out)
}

#[async_trait]
impl JobAdapter for WorkdayAdapter {
    async fn scrape(&self) -> Vec<ScrapedJob> {
        match self.fetch().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    company = %self.company,
                    provider = "workday",
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
        ProviderKind::Workday
    }
}
