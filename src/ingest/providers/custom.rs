// src/ingest/providers/custom.rs
//! No-op adapter for manually curated companies. Their postings are entered
//! by hand through the store; nothing is ever fetched.

use async_trait::async_trait;

use crate::ingest::types::{JobAdapter, ProviderKind, ScrapedJob};

pub struct CustomAdapter {
    company: String,
}

impl CustomAdapter {
    pub fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
        }
    }
}

#[async_trait]
impl JobAdapter for CustomAdapter {
    async fn scrape(&self) -> Vec<ScrapedJob> {
        tracing::debug!(company = %self.company, "custom provider is never auto-scraped");
        Vec::new()
    }

    fn company(&self) -> &str {
        &self.company
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Custom
    }
}
