//! store.rs — canonical job records and the query contract the pipeline
//! consumes. The in-memory implementation keeps per-identity writes atomic
//! under one lock; concurrent passes are serialized by the scheduler, not here.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::types::ScrapedJob;

/// Lifecycle + workflow states. `new`/`seen`/`expired` are pipeline-managed;
/// `applied`/`archived` are user-set and never touched by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    New,
    Seen,
    Applied,
    Archived,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Persisted posting. Created on first sighting of an identity; mutated by the
/// pass bookkeeping on every later sighting; never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalJob {
    pub identity: String,
    pub company: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub requirements: String,
    pub tech_stack: Vec<String>,
    pub location: String,
    pub remote: bool,
    /// Publication timestamp reported by the provider, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub expiry_check_count: u32,
}

/// Filters for `query_jobs`. Expired jobs are excluded unless asked for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub priority: Option<Priority>,
    pub company: Option<String>,
    pub min_alignment: Option<u8>,
    pub remote: Option<bool>,
    #[serde(default)]
    pub include_expired: bool,
}

/// The documented query contract between the pipeline and persistence.
/// Everything the aggregator, expiry tracker, and API layer need, nothing else.
pub trait JobStore: Send + Sync {
    fn get_job_by_identity(&self, identity: &str) -> Option<CanonicalJob>;

    /// Insert a first-sighted posting with status `new` and a zero miss
    /// counter. Returns the identity.
    fn add_job(&self, scraped: &ScrapedJob) -> String;

    /// Resighting: reset the miss counter and update `last_seen_at`. Moves
    /// `new` and `expired` to `seen`; `applied`/`archived` and all user-set
    /// fields are left untouched. Returns false for an unknown identity.
    fn mark_job_as_seen(&self, identity: &str) -> bool;

    /// Non-expired jobs eligible for miss counting.
    fn get_all_jobs_for_expiry_check(&self) -> Vec<CanonicalJob>;

    fn increment_expiry_check_count(&self, identity: &str);

    /// Identities whose miss counter has reached `threshold` (expired jobs
    /// excluded; they cannot re-expire).
    fn detect_expired_jobs(&self, threshold: u32) -> Vec<String>;

    fn mark_job_expired(&self, identity: &str);

    fn query_jobs(&self, filter: &JobFilter) -> Vec<CanonicalJob>;

    fn set_priority(&self, identity: &str, priority: Priority) -> bool;

    fn set_alignment_score(&self, identity: &str, score: u8) -> bool;

    fn set_notes(&self, identity: &str, notes: Option<String>) -> bool;

    fn count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    inner: RwLock<HashMap<String, CanonicalJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn get_job_by_identity(&self, identity: &str) -> Option<CanonicalJob> {
        let map = self.inner.read().expect("job store poisoned");
        map.get(identity).cloned()
    }

    fn add_job(&self, scraped: &ScrapedJob) -> String {
        let identity = scraped.identity();
        let now = Utc::now();
        let job = CanonicalJob {
            identity: identity.clone(),
            company: scraped.company.clone(),
            title: scraped.title.clone(),
            url: scraped.url.clone(),
            description: scraped.description.clone(),
            requirements: scraped.requirements.clone(),
            tech_stack: scraped.tech_stack.clone(),
            location: scraped.location.clone(),
            remote: scraped.remote,
            posted_at: scraped
                .posted_at
                .and_then(|ts| DateTime::from_timestamp(ts as i64, 0)),
            status: JobStatus::New,
            priority: Priority::Normal,
            alignment_score: None,
            notes: None,
            first_seen_at: now,
            last_seen_at: now,
            expiry_check_count: 0,
        };
        let mut map = self.inner.write().expect("job store poisoned");
        map.entry(identity.clone()).or_insert(job);
        identity
    }

    fn mark_job_as_seen(&self, identity: &str) -> bool {
        let mut map = self.inner.write().expect("job store poisoned");
        match map.get_mut(identity) {
            Some(job) => {
                job.expiry_check_count = 0;
                job.last_seen_at = Utc::now();
                if matches!(job.status, JobStatus::New | JobStatus::Expired) {
                    job.status = JobStatus::Seen;
                }
                true
            }
            None => false,
        }
    }

    fn get_all_jobs_for_expiry_check(&self) -> Vec<CanonicalJob> {
        let map = self.inner.read().expect("job store poisoned");
        map.values()
            .filter(|j| j.status != JobStatus::Expired)
            .cloned()
            .collect()
    }

    fn increment_expiry_check_count(&self, identity: &str) {
        let mut map = self.inner.write().expect("job store poisoned");
        if let Some(job) = map.get_mut(identity) {
            job.expiry_check_count = job.expiry_check_count.saturating_add(1);
        }
    }

    fn detect_expired_jobs(&self, threshold: u32) -> Vec<String> {
        let map = self.inner.read().expect("job store poisoned");
        let mut out: Vec<String> = map
            .values()
            .filter(|j| j.status != JobStatus::Expired && j.expiry_check_count >= threshold)
            .map(|j| j.identity.clone())
            .collect();
        out.sort();
        out
    }

    fn mark_job_expired(&self, identity: &str) {
        let mut map = self.inner.write().expect("job store poisoned");
        if let Some(job) = map.get_mut(identity) {
            job.status = JobStatus::Expired;
        }
    }

    fn query_jobs(&self, filter: &JobFilter) -> Vec<CanonicalJob> {
        let map = self.inner.read().expect("job store poisoned");
        let mut out: Vec<CanonicalJob> = map
            .values()
            .filter(|j| filter.include_expired || j.status != JobStatus::Expired)
            .filter(|j| filter.status.map_or(true, |s| j.status == s))
            .filter(|j| filter.priority.map_or(true, |p| j.priority == p))
            .filter(|j| {
                filter
                    .company
                    .as_deref()
                    .map_or(true, |c| j.company.eq_ignore_ascii_case(c))
            })
            .filter(|j| {
                filter
                    .min_alignment
                    .map_or(true, |min| j.alignment_score.is_some_and(|s| s >= min))
            })
            .filter(|j| filter.remote.map_or(true, |r| j.remote == r))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.last_seen_at.cmp(&a.last_seen_at));
        out
    }

    fn set_priority(&self, identity: &str, priority: Priority) -> bool {
        let mut map = self.inner.write().expect("job store poisoned");
        match map.get_mut(identity) {
            Some(job) => {
                job.priority = priority;
                true
            }
            None => false,
        }
    }

    fn set_alignment_score(&self, identity: &str, score: u8) -> bool {
        let mut map = self.inner.write().expect("job store poisoned");
        match map.get_mut(identity) {
            Some(job) => {
                job.alignment_score = Some(score.min(100));
                true
            }
            None => false,
        }
    }

    fn set_notes(&self, identity: &str, notes: Option<String>) -> bool {
        let mut map = self.inner.write().expect("job store poisoned");
        match map.get_mut(identity) {
            Some(job) => {
                job.notes = notes;
                true
            }
            None => false,
        }
    }

    fn count(&self) -> usize {
        let map = self.inner.read().expect("job store poisoned");
        map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraped(company: &str, title: &str) -> ScrapedJob {
        ScrapedJob {
            company: company.into(),
            title: title.into(),
            url: format!("https://{}.example/jobs", company.to_lowercase()),
            description: "desc".into(),
            requirements: String::new(),
            tech_stack: vec![],
            location: "Remote".into(),
            remote: true,
            posted_at: None,
        }
    }

    #[test]
    fn add_is_idempotent_per_identity() {
        let store = InMemoryJobStore::new();
        let a = store.add_job(&scraped("Acme", "Backend Engineer"));
        let b = store.add_job(&scraped("Acme", "Backend Engineer"));
        assert_eq!(a, b);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn mark_seen_resets_counter_and_promotes_status() {
        let store = InMemoryJobStore::new();
        let id = store.add_job(&scraped("Acme", "Backend Engineer"));
        store.increment_expiry_check_count(&id);
        store.increment_expiry_check_count(&id);

        assert!(store.mark_job_as_seen(&id));
        let job = store.get_job_by_identity(&id).unwrap();
        assert_eq!(job.expiry_check_count, 0);
        assert_eq!(job.status, JobStatus::Seen);
    }

    #[test]
    fn mark_seen_leaves_user_states_alone() {
        let store = InMemoryJobStore::new();
        let id = store.add_job(&scraped("Acme", "Backend Engineer"));
        store.set_priority(&id, Priority::High);
        store.set_notes(&id, Some("phone screen booked".into()));
        {
            let mut map = store.inner.write().unwrap();
            map.get_mut(&id).unwrap().status = JobStatus::Applied;
        }
        store.mark_job_as_seen(&id);
        let job = store.get_job_by_identity(&id).unwrap();
        assert_eq!(job.status, JobStatus::Applied);
        assert_eq!(job.priority, Priority::High);
        assert_eq!(job.notes.as_deref(), Some("phone screen booked"));
    }

    #[test]
    fn resighting_an_expired_job_revives_it() {
        let store = InMemoryJobStore::new();
        let id = store.add_job(&scraped("Acme", "Backend Engineer"));
        for _ in 0..3 {
            store.increment_expiry_check_count(&id);
        }
        assert_eq!(store.detect_expired_jobs(3), vec![id.clone()]);
        store.mark_job_expired(&id);

        store.mark_job_as_seen(&id);
        let job = store.get_job_by_identity(&id).unwrap();
        assert_eq!(job.status, JobStatus::Seen);
        assert_eq!(job.expiry_check_count, 0);
    }

    #[test]
    fn expired_jobs_leave_the_expiry_sweep() {
        let store = InMemoryJobStore::new();
        let id = store.add_job(&scraped("Acme", "Backend Engineer"));
        for _ in 0..3 {
            store.increment_expiry_check_count(&id);
        }
        store.mark_job_expired(&id);
        assert!(store.get_all_jobs_for_expiry_check().is_empty());
        assert!(store.detect_expired_jobs(3).is_empty());
    }

    #[test]
    fn default_query_hides_expired() {
        let store = InMemoryJobStore::new();
        let id = store.add_job(&scraped("Acme", "Backend Engineer"));
        store.add_job(&scraped("Acme", "Frontend Engineer"));
        store.mark_job_expired(&id);

        assert_eq!(store.query_jobs(&JobFilter::default()).len(), 1);
        let all = store.query_jobs(&JobFilter {
            include_expired: true,
            ..Default::default()
        });
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn filters_compose() {
        let store = InMemoryJobStore::new();
        let id = store.add_job(&scraped("Acme", "Backend Engineer"));
        store.add_job(&scraped("Globex", "Frontend Engineer"));
        store.set_alignment_score(&id, 80);

        let hits = store.query_jobs(&JobFilter {
            company: Some("acme".into()),
            min_alignment: Some(70),
            remote: Some(true),
            ..Default::default()
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identity, id);

        let none = store.query_jobs(&JobFilter {
            min_alignment: Some(90),
            ..Default::default()
        });
        assert!(none.is_empty());
    }
}
