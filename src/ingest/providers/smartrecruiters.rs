// src/ingest/providers/smartrecruiters.rs
//! SmartRecruiters public postings API. The listing endpoint exposes no
//! description body, so the canonical description is assembled from the
//! listing fields and requirements degrade to the prefix fallback.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::providers::parse_rfc3339_to_unix;
use crate::ingest::types::{JobAdapter, ProviderKind, ScrapedJob};
use crate::ingest::{detect_remote, extract_requirements, extract_tech_stack, normalize_text};

#[derive(Debug, Deserialize)]
struct PostingsResponse {
    #[serde(default)]
    content: Vec<Posting>,
}

#[derive(Debug, Deserialize)]
struct Posting {
    name: String,
    #[serde(default)]
    location: Option<PostingLocation>,
    #[serde(default, rename = "releasedDate")]
    released_date: Option<String>,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    department: Option<Labeled>,
    #[serde(default)]
    function: Option<Labeled>,
}

#[derive(Debug, Deserialize)]
struct PostingLocation {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    remote: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Labeled {
    #[serde(default)]
    label: Option<String>,
}

pub struct SmartRecruitersAdapter {
    company: String,
    company_id: String,
    client: reqwest::Client,
}

impl SmartRecruitersAdapter {
    pub fn new(company: &str, company_id: String, client: reqwest::Client) -> Self {
        Self {
            company: company.to_string(),
            company_id,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.smartrecruiters.com/v1/companies/{}/postings",
            self.company_id
        )
    }

    async fn fetch(&self) -> Result<Vec<ScrapedJob>> {
        let resp = self
            .client
            .get(self.endpoint())
            .send()
            .await
            .context("smartrecruiters http get")?
            .error_for_status()
            .context("smartrecruiters http status")?;
        let body = resp.text().await.context("smartrecruiters http body")?;
        parse_postings(&body, &self.company)
    }
}

/// Parse one postings payload. Pure; fixture tests call this directly.
pub fn parse_postings(body: &str, company: &str) -> Result<Vec<ScrapedJob>> {
    let t0 = std::time::Instant::now();
    let parsed: PostingsResponse =
        serde_json::from_str(body).context("parsing smartrecruiters json")?;

    let mut out = Vec::with_capacity(parsed.content.len());
    for posting in parsed.content {
        let title = normalize_text(&posting.name);
        if title.is_empty() {
            continue;
        }

        let (location, explicit_remote) = match &posting.location {
            Some(loc) => {
                let mut parts = Vec::new();
                if let Some(city) = loc.city.as_deref().filter(|s| !s.is_empty()) {
                    parts.push(city.to_string());
                }
                if let Some(country) = loc.country.as_deref().filter(|s| !s.is_empty()) {
                    parts.push(country.to_uppercase());
                }
                (parts.join(", "), loc.remote.unwrap_or(false))
            }
            None => (String::new(), false),
        };

        let mut description = title.clone();
        for labeled in [&posting.department, &posting.function] {
            if let Some(label) = labeled.as_ref().and_then(|l| l.label.as_deref()) {
                description.push_str(". ");
                description.push_str(label);
            }
        }
        if !location.is_empty() {
            description.push_str(". ");
            description.push_str(&location);
        }
        let description = normalize_text(&description);

        out.push(ScrapedJob {
            company: company.to_string(),
            title,
            url: posting.reference.unwrap_or_default(),
            requirements: extract_requirements(&description),
            tech_stack: extract_tech_stack(&description),
            remote: explicit_remote || detect_remote(&location, &description),
            location,
            posted_at: posting
                .released_date
                .as_deref()
                .and_then(parse_rfc3339_to_unix),
            description,
        });
    }

    histogram!("scrape_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("scrape_jobs_scraped_total").increment(out.len() as u64);
    Ok(out)
}

#[async_trait]
impl JobAdapter for SmartRecruitersAdapter {
    async fn scrape(&self) -> Vec<ScrapedJob> {
        match self.fetch().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    company = %self.company,
                    provider = "smartrecruiters",
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
        ProviderKind::SmartRecruiters
    }
}
