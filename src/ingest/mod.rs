// src/ingest/mod.rs
pub mod factory;
pub mod providers;
pub mod scheduler;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

use crate::ingest::factory::build_adapter;
use crate::ingest::types::{Company, JobAdapter, ProviderKind, ScrapedJob};
use crate::matching::{contains_phrase, normalize};
use crate::store::JobStore;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scrape_passes_total", "Completed aggregate passes.");
        describe_counter!(
            "scrape_jobs_scraped_total",
            "Postings parsed from provider payloads."
        );
        describe_counter!("scrape_jobs_new_total", "Postings inserted as new.");
        describe_counter!("scrape_jobs_expired_total", "Postings transitioned to expired.");
        describe_counter!(
            "scrape_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("scrape_parse_ms", "Provider payload parse time in milliseconds.");
        describe_gauge!("scrape_last_pass_ts", "Unix ts when the last pass finished.");
    });
}

/// Normalize provider text: decode HTML entities, strip tags, collapse
/// whitespace. Providers run every text field through this before it reaches
/// a ScrapedJob.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // Length cap: 8000 chars (job descriptions, not headlines)
    if out.chars().count() > 8000 {
        out = out.chars().take(8000).collect();
    }

    out
}

static RE_REQUIREMENTS_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(requirements|qualifications|what you.ll need|what we.re looking for|who you are|must have)\b:?",
    )
    .unwrap()
});

const REQUIREMENTS_EXCERPT_CHARS: usize = 600;
const REQUIREMENTS_FALLBACK_CHARS: usize = 300;

/// Bounded excerpt following a recognizable requirements header; degrades to
/// a fixed-length prefix of the description when no header is present.
pub fn extract_requirements(description: &str) -> String {
    if let Some(m) = RE_REQUIREMENTS_HEADER.find(description) {
        description[m.end()..]
            .chars()
            .take(REQUIREMENTS_EXCERPT_CHARS)
            .collect::<String>()
            .trim()
            .to_string()
    } else {
        description
            .chars()
            .take(REQUIREMENTS_FALLBACK_CHARS)
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// Canonical display name -> spellings tested against normalized text.
static TECH_TOKENS: &[(&str, &[&str])] = &[
    ("Rust", &["rust"]),
    ("Go", &["golang"]),
    ("Python", &["python"]),
    ("Java", &["java"]),
    ("Kotlin", &["kotlin"]),
    ("Swift", &["swift"]),
    ("TypeScript", &["typescript"]),
    ("JavaScript", &["javascript"]),
    ("C++", &["c++"]),
    ("Ruby", &["ruby"]),
    ("PHP", &["php"]),
    ("Node.js", &["node.js", "nodejs"]),
    ("React", &["react"]),
    ("Vue", &["vue", "vue.js"]),
    ("Angular", &["angular"]),
    ("Django", &["django"]),
    ("Rails", &["rails"]),
    ("Spring", &["spring boot", "spring"]),
    ("Flutter", &["flutter"]),
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MySQL", &["mysql"]),
    ("MongoDB", &["mongodb"]),
    ("Redis", &["redis"]),
    ("Elasticsearch", &["elasticsearch"]),
    ("Kafka", &["kafka"]),
    ("GraphQL", &["graphql"]),
    ("gRPC", &["grpc"]),
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("Terraform", &["terraform"]),
    ("AWS", &["aws"]),
    ("GCP", &["gcp", "google cloud"]),
    ("Azure", &["azure"]),
    ("Spark", &["spark"]),
    ("Airflow", &["airflow"]),
    ("PyTorch", &["pytorch"]),
    ("TensorFlow", &["tensorflow"]),
    ("Linux", &["linux"]),
];

/// Tech tokens present in the text, canonical casing, dictionary order.
pub fn extract_tech_stack(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    TECH_TOKENS
        .iter()
        .filter(|(_, spellings)| spellings.iter().any(|s| contains_phrase(&normalized, s)))
        .map(|(canonical, _)| canonical.to_string())
        .collect()
}

static REMOTE_MARKERS: &[&str] = &[
    "remote",
    "fully remote",
    "remote first",
    "remote friendly",
    "work from home",
    "wfh",
    "work from anywhere",
    "distributed team",
];

/// Remote flag, derived from the location first and the description second.
pub fn detect_remote(location: &str, description: &str) -> bool {
    let loc = normalize(location);
    if REMOTE_MARKERS.iter().any(|m| contains_phrase(&loc, m)) {
        return true;
    }
    let desc = normalize(description);
    REMOTE_MARKERS.iter().any(|m| contains_phrase(&desc, m))
}

/// Outcome of one aggregate -> dedup -> expiry pass.
#[derive(Debug, Default)]
pub struct PassSummary {
    pub companies_scraped: usize,
    pub companies_skipped: usize,
    pub jobs_scraped: usize,
    /// Identities inserted this pass.
    pub new_jobs: Vec<String>,
    pub resighted: usize,
    /// Identities transitioned to expired this pass.
    pub expired: Vec<String>,
}

/// Identity is (company, title) only, so two genuinely distinct postings with
/// near-identical titles collapse. Surface the risk in logs without changing
/// behavior.
fn warn_near_duplicate_titles(scraped: &[ScrapedJob]) {
    for (i, a) in scraped.iter().enumerate() {
        for b in scraped.iter().skip(i + 1) {
            if !a.company.eq_ignore_ascii_case(&b.company) || a.identity() == b.identity() {
                continue;
            }
            let sim = strsim::normalized_levenshtein(
                &a.title.to_lowercase(),
                &b.title.to_lowercase(),
            );
            if sim >= 0.9 {
                tracing::warn!(
                    target: "ingest",
                    company = %a.company,
                    title_a = %a.title,
                    title_b = %b.title,
                    similarity = sim,
                    "near_duplicate_title"
                );
            }
        }
    }
}

/// Run one full pass: build adapters for the eligible companies, then hand
/// off to `run_pass_with_adapters`. Failed adapters degrade to empty results;
/// the next scheduled pass is the retry mechanism.
pub async fn run_pass(
    companies: &[Company],
    store: &dyn JobStore,
    http: &reqwest::Client,
    expiry_threshold: u32,
) -> PassSummary {
    let eligible = companies
        .iter()
        .filter(|c| c.active && c.provider != ProviderKind::Custom);

    let mut adapters = Vec::new();
    let mut skipped = 0usize;
    for company in eligible {
        match build_adapter(company, http) {
            Some(adapter) => adapters.push(adapter),
            None => skipped += 1,
        }
    }

    let mut summary = run_pass_with_adapters(adapters, store, expiry_threshold).await;
    summary.companies_skipped = skipped;
    summary
}

/// The pass proper, over already-constructed adapters. Exposed separately so
/// tests can drive the pipeline with fixture adapters.
pub async fn run_pass_with_adapters(
    adapters: Vec<Box<dyn JobAdapter>>,
    store: &dyn JobStore,
    expiry_threshold: u32,
) -> PassSummary {
    ensure_metrics_described();
    let mut summary = PassSummary::default();

    let scraped_companies: Vec<String> =
        adapters.iter().map(|a| a.company().to_string()).collect();

    let mut handles = Vec::new();
    for adapter in adapters {
        handles.push(tokio::spawn(async move { adapter.scrape().await }));
    }
    summary.companies_scraped = handles.len();

    // Join barrier: bookkeeping must not start until every adapter has
    // finished, otherwise the "not seen this pass" set is unsound.
    let mut scraped: Vec<ScrapedJob> = Vec::new();
    for h in handles {
        match h.await {
            Ok(mut jobs) => scraped.append(&mut jobs),
            Err(e) => {
                tracing::warn!(error = ?e, "adapter task join failed");
            }
        }
    }
    summary.jobs_scraped = scraped.len();

    warn_near_duplicate_titles(&scraped);

    // Dedup: first sighting inserts; resighting resets the miss counter and
    // leaves user-set fields alone.
    let mut seen_identities: HashSet<String> = HashSet::new();
    for job in &scraped {
        let identity = job.identity();
        if !seen_identities.insert(identity.clone()) {
            continue; // same identity scraped twice within one pass
        }
        if store.get_job_by_identity(&identity).is_some() {
            store.mark_job_as_seen(&identity);
            summary.resighted += 1;
        } else {
            store.add_job(job);
            summary.new_jobs.push(identity);
        }
    }

    // Expiry: mark-seen already happened, so increments cannot hit a job
    // resighted in this pass. Misses count only against companies actually
    // scraped this pass, so a filtered pass cannot penalize the rest.
    let scraped_set: HashSet<String> = scraped_companies
        .iter()
        .map(|c| c.to_lowercase())
        .collect();
    for job in store.get_all_jobs_for_expiry_check() {
        if seen_identities.contains(&job.identity) {
            continue;
        }
        if !scraped_set.contains(&job.company.to_lowercase()) {
            continue;
        }
        store.increment_expiry_check_count(&job.identity);
    }
    for identity in store.detect_expired_jobs(expiry_threshold) {
        store.mark_job_expired(&identity);
        summary.expired.push(identity);
    }

    counter!("scrape_passes_total").increment(1);
    counter!("scrape_jobs_new_total").increment(summary.new_jobs.len() as u64);
    counter!("scrape_jobs_expired_total").increment(summary.expired.len() as u64);
    gauge!("scrape_last_pass_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    summary
}
