// tests/ingest_expiry.rs
//
// Expiry monotonicity: a posting absent from exactly three consecutive passes
// expires at the end of the third, not earlier; a resighting at any point
// before that resets the counter.

use async_trait::async_trait;

use job_radar::ingest::run_pass_with_adapters;
use job_radar::ingest::types::{JobAdapter, ProviderKind, ScrapedJob};
use job_radar::store::{InMemoryJobStore, JobStatus, JobStore};

const EXPIRY_THRESHOLD: u32 = 3;

struct FixtureAdapter {
    company: String,
    titles: Vec<String>,
}

impl FixtureAdapter {
    fn boxed(company: &str, titles: &[&str]) -> Vec<Box<dyn JobAdapter>> {
        vec![Box::new(Self {
            company: company.to_string(),
            titles: titles.iter().map(|t| t.to_string()).collect(),
        })]
    }
}

#[async_trait]
impl JobAdapter for FixtureAdapter {
    async fn scrape(&self) -> Vec<ScrapedJob> {
        self.titles
            .iter()
            .map(|t| ScrapedJob {
                company: self.company.clone(),
                title: t.clone(),
                url: String::new(),
                description: String::new(),
                requirements: String::new(),
                tech_stack: vec![],
                location: String::new(),
                remote: false,
                posted_at: None,
            })
            .collect()
    }

    fn company(&self) -> &str {
        &self.company
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Lever
    }
}

#[tokio::test]
async fn expires_exactly_after_third_consecutive_miss() {
    let store = InMemoryJobStore::new();

    // Pass N: posting present.
    let first = run_pass_with_adapters(
        FixtureAdapter::boxed("Acme", &["Backend Engineer"]),
        &store,
        EXPIRY_THRESHOLD,
    )
    .await;
    let id = first.new_jobs[0].clone();

    // Passes N+1 and N+2: absent, but not yet expired.
    for expected_count in 1..=2u32 {
        let summary = run_pass_with_adapters(
            FixtureAdapter::boxed("Acme", &[]),
            &store,
            EXPIRY_THRESHOLD,
        )
        .await;
        assert!(summary.expired.is_empty(), "expired too early");
        let job = store.get_job_by_identity(&id).unwrap();
        assert_eq!(job.expiry_check_count, expected_count);
        assert_ne!(job.status, JobStatus::Expired);
    }

    // Pass N+3: third consecutive miss -> expired.
    let summary = run_pass_with_adapters(
        FixtureAdapter::boxed("Acme", &[]),
        &store,
        EXPIRY_THRESHOLD,
    )
    .await;
    assert_eq!(summary.expired, vec![id.clone()]);
    assert_eq!(
        store.get_job_by_identity(&id).unwrap().status,
        JobStatus::Expired
    );
}

#[tokio::test]
async fn resighting_before_third_miss_resets_counter() {
    let store = InMemoryJobStore::new();
    let first = run_pass_with_adapters(
        FixtureAdapter::boxed("Acme", &["Backend Engineer"]),
        &store,
        EXPIRY_THRESHOLD,
    )
    .await;
    let id = first.new_jobs[0].clone();

    // Two misses...
    for _ in 0..2 {
        run_pass_with_adapters(FixtureAdapter::boxed("Acme", &[]), &store, EXPIRY_THRESHOLD)
            .await;
    }
    assert_eq!(store.get_job_by_identity(&id).unwrap().expiry_check_count, 2);

    // ...then it reappears at N+2: counter back to zero, never expires.
    run_pass_with_adapters(
        FixtureAdapter::boxed("Acme", &["Backend Engineer"]),
        &store,
        EXPIRY_THRESHOLD,
    )
    .await;
    let job = store.get_job_by_identity(&id).unwrap();
    assert_eq!(job.expiry_check_count, 0);
    assert_eq!(job.status, JobStatus::Seen);

    // Three more misses are needed from here.
    for _ in 0..2 {
        let summary = run_pass_with_adapters(
            FixtureAdapter::boxed("Acme", &[]),
            &store,
            EXPIRY_THRESHOLD,
        )
        .await;
        assert!(summary.expired.is_empty());
    }
    let summary =
        run_pass_with_adapters(FixtureAdapter::boxed("Acme", &[]), &store, EXPIRY_THRESHOLD)
            .await;
    assert_eq!(summary.expired, vec![id]);
}

#[tokio::test]
async fn a_resighted_expired_posting_revives() {
    let store = InMemoryJobStore::new();
    let first = run_pass_with_adapters(
        FixtureAdapter::boxed("Acme", &["Backend Engineer"]),
        &store,
        EXPIRY_THRESHOLD,
    )
    .await;
    let id = first.new_jobs[0].clone();

    for _ in 0..3 {
        run_pass_with_adapters(FixtureAdapter::boxed("Acme", &[]), &store, EXPIRY_THRESHOLD)
            .await;
    }
    assert_eq!(
        store.get_job_by_identity(&id).unwrap().status,
        JobStatus::Expired
    );

    // The posting comes back: revived to seen with a fresh counter.
    run_pass_with_adapters(
        FixtureAdapter::boxed("Acme", &["Backend Engineer"]),
        &store,
        EXPIRY_THRESHOLD,
    )
    .await;
    let job = store.get_job_by_identity(&id).unwrap();
    assert_eq!(job.status, JobStatus::Seen);
    assert_eq!(job.expiry_check_count, 0);
}

#[tokio::test]
async fn expired_jobs_stay_out_of_default_views_but_are_retained() {
    let store = InMemoryJobStore::new();
    let first = run_pass_with_adapters(
        FixtureAdapter::boxed("Acme", &["Backend Engineer"]),
        &store,
        EXPIRY_THRESHOLD,
    )
    .await;
    let id = first.new_jobs[0].clone();

    for _ in 0..3 {
        run_pass_with_adapters(FixtureAdapter::boxed("Acme", &[]), &store, EXPIRY_THRESHOLD)
            .await;
    }

    // Never physically deleted.
    assert_eq!(store.count(), 1);
    assert!(store
        .query_jobs(&job_radar::store::JobFilter::default())
        .is_empty());
    assert!(store.get_job_by_identity(&id).is_some());
}
