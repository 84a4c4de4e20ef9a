// src/matching/domains.rs
//! Domain registry and alignment scorer: per-domain keyword detection with
//! individual thresholds, a directed transferability graph, and a 0–100
//! deterministic score with human-readable reasoning.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::matching::{contains_phrase, normalize, AlignmentResult};

pub const DEFAULT_DOMAINS_TOML: &str = include_str!("../../config/domains.toml");
pub const ENV_DOMAINS_CONFIG_PATH: &str = "DOMAINS_CONFIG_PATH";

/// Neutral score returned when a posting declares no detectable domain.
pub const NEUTRAL_SCORE: u8 = 70;

/// One professional specialization with its detection vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Minimum keyword hits before the domain counts as detected.
    pub required_count: usize,
    pub job_keywords: Vec<String>,
    pub cv_keywords: Vec<String>,
    /// Directed transfer targets; not guaranteed symmetric.
    #[serde(default)]
    pub transferable_to: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RegistryRoot {
    domains: Vec<Domain>,
}

/// Process-wide, read-only domain registry. Built once at startup and passed
/// by `Arc` into the matcher; never mutated afterwards.
#[derive(Debug)]
pub struct DomainRegistry {
    domains: Vec<Domain>,
    by_id: HashMap<String, usize>,
}

impl DomainRegistry {
    /// Load from a TOML string. Rejects duplicate ids and zero thresholds.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let root: RegistryRoot = toml::from_str(toml_str)?;
        let mut by_id = HashMap::with_capacity(root.domains.len());
        for (i, d) in root.domains.iter().enumerate() {
            if d.required_count == 0 {
                anyhow::bail!("domain `{}` has required_count 0", d.id);
            }
            if by_id.insert(d.id.clone(), i).is_some() {
                anyhow::bail!("duplicate domain id `{}`", d.id);
            }
        }
        Ok(Self {
            domains: root.domains,
            by_id,
        })
    }

    /// Load from `$DOMAINS_CONFIG_PATH` if set, else the embedded default.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = std::env::var(ENV_DOMAINS_CONFIG_PATH) {
            let path = PathBuf::from(p);
            let content = fs::read_to_string(&path).map_err(|e| {
                anyhow::anyhow!("failed to read domain registry at {}: {}", path.display(), e)
            })?;
            return Self::from_toml_str(&content);
        }
        Self::from_toml_str(DEFAULT_DOMAINS_TOML)
    }

    pub fn get(&self, id: &str) -> Option<&Domain> {
        self.by_id.get(id).map(|&i| &self.domains[i])
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Display names for known ids; unknown ids are silently filtered out.
    pub fn resolve_names(&self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.get(id).map(|d| d.name.clone()))
            .collect()
    }

    fn keyword_hits(normalized: &str, keywords: &[String]) -> usize {
        keywords
            .iter()
            .filter(|kw| contains_phrase(normalized, kw))
            .count()
    }

    fn detect(&self, normalized: &str, job_side: bool) -> Vec<String> {
        self.domains
            .iter()
            .filter(|d| {
                let kws = if job_side {
                    &d.job_keywords
                } else {
                    &d.cv_keywords
                };
                Self::keyword_hits(normalized, kws) >= d.required_count
            })
            .map(|d| d.id.clone())
            .collect()
    }

    /// Every domain whose job-keyword hit count in the combined normalized
    /// text reaches its own threshold. Multiple domains may be detected; a
    /// domain is never partially detected.
    pub fn detect_job_domains(&self, title: &str, description: &str) -> Vec<String> {
        let normalized = normalize(&format!("{} {}", title, description));
        self.detect(&normalized, true)
    }

    /// Same routine over the CV-side vocabulary.
    pub fn detect_cv_domains(&self, cv_text: &str) -> Vec<String> {
        let normalized = normalize(cv_text);
        self.detect(&normalized, false)
    }

    /// Classify each job domain as matched / transferable / mismatched against
    /// the candidate's domains and produce the alignment score + reasoning.
    pub fn match_user_domains(
        &self,
        cv_text: &str,
        user_domain_ids: &[String],
        job_domain_ids: &[String],
    ) -> AlignmentResult {
        // Candidate side: declared ids (unknown ones silently dropped) plus
        // domains detected from the CV text itself.
        let mut user_set: BTreeSet<String> = user_domain_ids
            .iter()
            .filter(|id| self.get(id).is_some())
            .cloned()
            .collect();
        for id in self.detect_cv_domains(cv_text) {
            user_set.insert(id);
        }
        let user_domains: Vec<String> = user_set.iter().cloned().collect();

        let job_domains: Vec<String> = job_domain_ids
            .iter()
            .filter(|id| self.get(id).is_some())
            .cloned()
            .collect();

        if job_domains.is_empty() {
            return AlignmentResult {
                job_domains,
                user_domains,
                matched: Vec::new(),
                transferable: Vec::new(),
                mismatched: Vec::new(),
                score: NEUTRAL_SCORE,
                reasoning: "No specific domain requirement was detected for this role; \
                            alignment is neutral."
                    .to_string(),
            };
        }

        let mut matched = Vec::new();
        let mut transferable = Vec::new();
        let mut mismatched = Vec::new();

        for jd in &job_domains {
            if user_set.contains(jd) {
                matched.push(jd.clone());
                continue;
            }
            // Transferability checked in either direction: a user domain that
            // lists this job domain as a target, or the job domain listing a
            // user domain as a target.
            let transfers = user_set.iter().any(|u| {
                self.get(u)
                    .is_some_and(|d| d.transferable_to.iter().any(|t| t == jd))
                    || self
                        .get(jd)
                        .is_some_and(|d| d.transferable_to.iter().any(|t| t == u))
            });
            if transfers {
                transferable.push(jd.clone());
            } else {
                mismatched.push(jd.clone());
            }
        }

        let total = job_domains.len() as f64;
        let match_ratio = matched.len() as f64 / total;
        let transferable_ratio = transferable.len() as f64 / total;
        let mismatch_ratio = mismatched.len() as f64 / total;
        let raw = match_ratio * 100.0 + transferable_ratio * 60.0 + mismatch_ratio * 20.0;
        let score = raw.round().min(100.0) as u8;

        let reasoning = self.build_reasoning(&matched, &transferable, &mismatched, job_domains.len());

        AlignmentResult {
            job_domains,
            user_domains,
            matched,
            transferable,
            mismatched,
            score,
            reasoning,
        }
    }

    fn build_reasoning(
        &self,
        matched: &[String],
        transferable: &[String],
        mismatched: &[String],
        total: usize,
    ) -> String {
        // Perfect match wins outright.
        if mismatched.is_empty() && matched.len() == total {
            return format!(
                "Exact domain match: your background directly covers {}.",
                self.resolve_names(matched).join(", ")
            );
        }

        let mut parts = Vec::new();
        if !matched.is_empty() {
            parts.push(format!(
                "Direct experience in {}.",
                self.resolve_names(matched).join(", ")
            ));
        }
        if !transferable.is_empty() {
            parts.push(format!(
                "Your skills transfer well to {}.",
                self.resolve_names(transferable).join(", ")
            ));
        }
        if !mismatched.is_empty() {
            let names = self.resolve_names(mismatched).join(", ");
            if matched.is_empty() && transferable.is_empty() {
                parts.push(format!(
                    "Significant mismatch: no direct or transferable experience for {}.",
                    names
                ));
            } else {
                parts.push(format!(
                    "Gap in {} — highlight transferable skills when applying.",
                    names
                ));
            }
        }
        parts.join(" ")
    }
}
