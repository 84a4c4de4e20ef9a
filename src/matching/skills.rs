// src/matching/skills.rs
//! Skill extraction against a static synonym dictionary. First matching
//! synonym marks a skill as found; remaining synonyms are skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::{contains_phrase, normalize};

static DEFAULT_DICTIONARY_JSON: &str = include_str!("../../skills_dictionary.json");

#[derive(Debug, Clone, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub category: String,
    pub synonyms: Vec<String>,
}

/// Read-only skill dictionary, built once at startup.
#[derive(Debug)]
pub struct SkillDictionary {
    entries: Vec<SkillEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillExtraction {
    /// Sorted set of canonical skill names found in the text.
    pub skills: Vec<String>,
    /// Category -> sorted skill names.
    pub categories: BTreeMap<String, Vec<String>>,
    pub confidence: Confidence,
}

impl SkillDictionary {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let entries: Vec<SkillEntry> = serde_json::from_str(json)?;
        anyhow::ensure!(!entries.is_empty(), "skill dictionary is empty");
        Ok(Self { entries })
    }

    /// The dictionary shipped with the binary.
    pub fn embedded() -> Self {
        Self::from_json_str(DEFAULT_DICTIONARY_JSON).expect("valid embedded skill dictionary")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extract(&self, text: &str) -> SkillExtraction {
        let normalized = normalize(text);

        let mut skills = Vec::new();
        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for entry in &self.entries {
            let found = entry
                .synonyms
                .iter()
                .any(|syn| contains_phrase(&normalized, syn));
            if found {
                skills.push(entry.name.clone());
                categories
                    .entry(entry.category.clone())
                    .or_default()
                    .push(entry.name.clone());
            }
        }

        skills.sort();
        for names in categories.values_mut() {
            names.sort();
        }

        let confidence = match skills.len() {
            n if n >= 10 => Confidence::High,
            n if n >= 5 => Confidence::Medium,
            _ => Confidence::Low,
        };

        SkillExtraction {
            skills,
            categories,
            confidence,
        }
    }
}

impl Default for SkillDictionary {
    fn default() -> Self {
        Self::embedded()
    }
}
