// src/matching/mod.rs
//! Deterministic matching engine: domain detection, skill extraction, and
//! role-level analysis behind one swappable matcher trait. Pure computation,
//! no I/O. The registry and dictionary are immutable after startup, so every
//! method is safe to call from any thread without synchronization.

pub mod domains;
pub mod role_level;
pub mod similarity;
pub mod skills;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::matching::domains::DomainRegistry;
use crate::matching::role_level::{analyze_role_level, RoleLevelAnalysis};
use crate::matching::skills::{SkillDictionary, SkillExtraction};

/// Normalize free text for keyword matching: case-fold, collapse punctuation
/// to whitespace, squeeze runs of whitespace.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for low in ch.to_lowercase() {
                out.push(low);
            }
            prev_space = false;
        } else if !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Word/phrase-boundary containment check. Both sides go through the same
/// normalization, so "Node.js" in a keyword list matches "node js" in text but
/// "java" never matches inside "javascript".
pub fn contains_phrase(normalized_text: &str, keyword: &str) -> bool {
    let kw = normalize(keyword);
    if kw.is_empty() {
        return false;
    }
    let padded = format!(" {} ", normalized_text);
    padded.contains(&format!(" {} ", kw))
}

/// Alignment between a candidate's domains and a posting's detected domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub job_domains: Vec<String>,
    pub user_domains: Vec<String>,
    pub matched: Vec<String>,
    pub transferable: Vec<String>,
    pub mismatched: Vec<String>,
    /// 0–100, deterministic.
    pub score: u8,
    pub reasoning: String,
}

/// The matcher capability consumed by callers. Exactly one conforming
/// implementation today (`KeywordMatcher`); the contract stays stable so a
/// generative backend can be added later without touching callers.
pub trait AlignmentMatcher: Send + Sync {
    fn detect_job_domains(&self, title: &str, description: &str) -> Vec<String>;
    fn match_domains(
        &self,
        cv_text: &str,
        user_domains: &[String],
        job_domains: &[String],
    ) -> AlignmentResult;
    fn extract_skills(&self, text: &str) -> SkillExtraction;
    fn analyze_role_level(&self, title: &str, description: &str, cv_text: &str)
        -> RoleLevelAnalysis;
    /// Backend name for diagnostics/headers.
    fn name(&self) -> &'static str;
}

pub type DynMatcher = Arc<dyn AlignmentMatcher>;

/// Keyword-driven matcher over the static registries.
pub struct KeywordMatcher {
    registry: Arc<DomainRegistry>,
    dictionary: Arc<SkillDictionary>,
}

impl KeywordMatcher {
    pub fn new(registry: Arc<DomainRegistry>, dictionary: Arc<SkillDictionary>) -> Self {
        Self {
            registry,
            dictionary,
        }
    }
}

impl AlignmentMatcher for KeywordMatcher {
    fn detect_job_domains(&self, title: &str, description: &str) -> Vec<String> {
        self.registry.detect_job_domains(title, description)
    }

    fn match_domains(
        &self,
        cv_text: &str,
        user_domains: &[String],
        job_domains: &[String],
    ) -> AlignmentResult {
        self.registry
            .match_user_domains(cv_text, user_domains, job_domains)
    }

    fn extract_skills(&self, text: &str) -> SkillExtraction {
        self.dictionary.extract(text)
    }

    fn analyze_role_level(
        &self,
        title: &str,
        description: &str,
        cv_text: &str,
    ) -> RoleLevelAnalysis {
        analyze_role_level(title, description, cv_text)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_and_punctuation() {
        assert_eq!(normalize("Node.js, PostgreSQL & REST!"), "node js postgresql rest");
        assert_eq!(normalize("  Senior   Engineer  "), "senior engineer");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn phrase_match_respects_word_boundaries() {
        let text = normalize("We use JavaScript and TypeScript daily.");
        assert!(contains_phrase(&text, "javascript"));
        assert!(contains_phrase(&text, "TypeScript"));
        assert!(!contains_phrase(&text, "java"));
        assert!(!contains_phrase(&text, "script"));
    }

    #[test]
    fn phrase_match_handles_multiword_keywords() {
        let text = normalize("Experience with distributed systems required.");
        assert!(contains_phrase(&text, "distributed systems"));
        assert!(!contains_phrase(&text, "systems distributed"));
    }

    #[test]
    fn keyword_in_punctuated_form_still_matches() {
        let text = normalize("Stack: Node.js + PostgreSQL");
        assert!(contains_phrase(&text, "node.js"));
        assert!(!contains_phrase(&text, "postgres ql"));
    }
}
