// src/ingest/types.rs
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Which ATS publishes a company's postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Greenhouse,
    Lever,
    Workday,
    Ashby,
    SmartRecruiters,
    /// Manually curated postings; never auto-scraped.
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Greenhouse => "greenhouse",
            ProviderKind::Lever => "lever",
            ProviderKind::Workday => "workday",
            ProviderKind::Ashby => "ashby",
            ProviderKind::SmartRecruiters => "smartrecruiters",
            ProviderKind::Custom => "custom",
        }
    }
}

/// Company configuration record. Read-only to the pipeline; lifecycle
/// management belongs to whoever maintains the roster file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub careers_url: String,
    pub provider: ProviderKind,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// One posting as parsed from a provider payload. Produced fresh on every
/// scrape; never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedJob {
    pub company: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub requirements: String,
    pub tech_stack: Vec<String>,
    pub location: String,
    pub remote: bool,
    /// Publication/refresh timestamp from the provider, unix seconds.
    pub posted_at: Option<u64>,
}

impl ScrapedJob {
    pub fn identity(&self) -> String {
        job_identity(&self.company, &self.title)
    }
}

/// Stable cross-run identity: a pure function of (company, title). URL and
/// location are deliberately excluded, so a re-scrape of the same title under
/// the same company resolves to the same identity even if the URL changed.
pub fn job_identity(company: &str, title: &str) -> String {
    let key = format!(
        "{}|{}",
        company.trim().to_lowercase(),
        title.trim().to_lowercase()
    );
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// One ATS adapter. `scrape` never errors past this boundary: fetch/parse
/// failures are logged inside the adapter and degrade to an empty list so the
/// aggregator's fan-out is not interrupted.
#[async_trait::async_trait]
pub trait JobAdapter: Send + Sync {
    async fn scrape(&self) -> Vec<ScrapedJob>;
    fn company(&self) -> &str;
    fn provider(&self) -> ProviderKind;
}
