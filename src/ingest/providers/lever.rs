// src/ingest/providers/lever.rs
//! Lever postings API (`mode=json`). Descriptions come split across a plain
//! field and HTML list sections; both are folded into one description.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::types::{JobAdapter, ProviderKind, ScrapedJob};
use crate::ingest::{detect_remote, extract_requirements, extract_tech_stack, normalize_text};

#[derive(Debug, Deserialize)]
struct Posting {
    text: String,
    #[serde(rename = "hostedUrl")]
    hosted_url: String,
    #[serde(default)]
    categories: Categories,
    #[serde(default, rename = "descriptionPlain")]
    description_plain: Option<String>,
    #[serde(default)]
    lists: Vec<Section>,
    /// Milliseconds since epoch.
    #[serde(default, rename = "createdAt")]
    created_at: Option<u64>,
    #[serde(default, rename = "workplaceType")]
    workplace_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Categories {
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

pub struct LeverAdapter {
    company: String,
    site: String,
    client: reqwest::Client,
}

impl LeverAdapter {
    pub fn new(company: &str, site: String, client: reqwest::Client) -> Self {
        Self {
            company: company.to_string(),
            site,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("https://api.lever.co/v0/postings/{}?mode=json", self.site)
    }

    async fn fetch(&self) -> Result<Vec<ScrapedJob>> {
        let resp = self
            .client
            .get(self.endpoint())
            .send()
            .await
            .context("lever http get")?
            .error_for_status()
            .context("lever http status")?;
        let body = resp.text().await.context("lever http body")?;
        parse_postings(&body, &self.company)
    }
}

/// Parse a postings payload. Pure; fixture tests call this directly.
pub fn parse_postings(body: &str, company: &str) -> Result<Vec<ScrapedJob>> {
    let t0 = std::time::Instant::now();
    let postings: Vec<Posting> = serde_json::from_str(body).context("parsing lever json")?;

    let mut out = Vec::with_capacity(postings.len());
    for posting in postings {
        let title = normalize_text(&posting.text);
        if title.is_empty() {
            continue;
        }

        let mut description = posting.description_plain.unwrap_or_default();
        for section in posting.lists {
            if let Some(heading) = section.text {
                description.push_str("\n");
                description.push_str(&heading);
                description.push(':');
            }
            if let Some(content) = section.content {
                description.push('\n');
                description.push_str(&content);
            }
        }
        let description = normalize_text(&description);
        let location = posting
            .categories
            .location
            .map(|l| normalize_text(&l))
            .unwrap_or_default();

        let explicit_remote = posting
            .workplace_type
            .as_deref()
            .is_some_and(|w| w.eq_ignore_ascii_case("remote"));

        out.push(ScrapedJob {
            company: company.to_string(),
            title,
            url: posting.hosted_url,
            requirements: extract_requirements(&description),
            tech_stack: extract_tech_stack(&description),
            remote: explicit_remote || detect_remote(&location, &description),
            location,
            posted_at: posting.created_at.map(|ms| ms / 1_000),
            description,
        });
    }

    histogram!("scrape_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("scrape_jobs_scraped_total").increment(out.len() as u64);
    Ok(out)
}

#[async_trait]
impl JobAdapter for LeverAdapter {
    async fn scrape(&self) -> Vec<ScrapedJob> {
        match self.fetch().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    company = %self.company,
                    provider = "lever",
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
        ProviderKind::Lever
    }
}
