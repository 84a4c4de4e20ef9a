// src/matching/role_level.rs
//! Seniority extraction and progression analysis. An ordered pattern table
//! (most senior/specific first) gives high-confidence hits; an explicit
//! years-of-experience mention is the low-confidence fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::{contains_phrase, normalize};

/// Ordered seniority scale. Discriminants are the comparison ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLevel {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
    Staff,
    Principal,
    Director,
    Vp,
    CLevel,
}

impl RoleLevel {
    pub fn rank(self) -> i32 {
        match self {
            RoleLevel::Intern => 0,
            RoleLevel::Junior => 1,
            RoleLevel::Mid => 2,
            RoleLevel::Senior => 3,
            RoleLevel::Lead => 4,
            RoleLevel::Staff => 5,
            RoleLevel::Principal => 6,
            RoleLevel::Director => 7,
            RoleLevel::Vp => 8,
            RoleLevel::CLevel => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoleLevel::Intern => "intern",
            RoleLevel::Junior => "junior",
            RoleLevel::Mid => "mid",
            RoleLevel::Senior => "senior",
            RoleLevel::Lead => "lead",
            RoleLevel::Staff => "staff",
            RoleLevel::Principal => "principal",
            RoleLevel::Director => "director",
            RoleLevel::Vp => "vp",
            RoleLevel::CLevel => "c-level",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelConfidence {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDetection {
    pub level: RoleLevel,
    pub confidence: LevelConfidence,
}

struct LevelRule {
    level: RoleLevel,
    patterns: &'static [&'static str],
}

/// Tie-break priority is the table order: most senior/specific rules first,
/// so "Senior Staff Engineer" resolves to staff, not senior.
static LEVEL_RULES: &[LevelRule] = &[
    LevelRule {
        level: RoleLevel::CLevel,
        patterns: &[
            "chief technology officer",
            "chief executive officer",
            "chief product officer",
            "chief information officer",
            "cto",
            "ceo",
            "cpo",
            "cio",
        ],
    },
    LevelRule {
        level: RoleLevel::Vp,
        patterns: &["vice president", "vp"],
    },
    LevelRule {
        level: RoleLevel::Director,
        patterns: &["director", "head of"],
    },
    LevelRule {
        level: RoleLevel::Principal,
        patterns: &["principal", "distinguished"],
    },
    LevelRule {
        level: RoleLevel::Staff,
        patterns: &["staff"],
    },
    LevelRule {
        level: RoleLevel::Lead,
        patterns: &["lead", "tech lead", "team lead"],
    },
    LevelRule {
        level: RoleLevel::Senior,
        patterns: &["senior", "sr"],
    },
    LevelRule {
        level: RoleLevel::Mid,
        patterns: &["mid-level", "mid level", "intermediate"],
    },
    LevelRule {
        level: RoleLevel::Junior,
        patterns: &["junior", "jr", "entry level", "entry-level", "graduate", "new grad"],
    },
    LevelRule {
        level: RoleLevel::Intern,
        patterns: &["intern", "internship", "co-op", "working student"],
    },
];

static RE_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b[^.;\n]{0,40}?\bexperience\b")
        .expect("years regex")
});

fn match_level_patterns(text: &str) -> Option<RoleLevel> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }
    for rule in LEVEL_RULES {
        for pat in rule.patterns {
            if contains_phrase(&normalized, pat) {
                return Some(rule.level);
            }
        }
    }
    None
}

/// Largest explicit "N years ... experience" mention, if any.
fn extract_years(text: &str) -> Option<u32> {
    RE_YEARS
        .captures_iter(text)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .max()
}

fn level_from_years(years: u32) -> Option<RoleLevel> {
    match years {
        y if y >= 10 => Some(RoleLevel::Principal),
        y if y >= 7 => Some(RoleLevel::Staff),
        y if y >= 5 => Some(RoleLevel::Lead),
        y if y >= 3 => Some(RoleLevel::Senior),
        y if y >= 1 => Some(RoleLevel::Mid),
        _ => None,
    }
}

/// Extract a level from a single text: ordered patterns, then the years
/// fallback, then mid-level by default.
pub fn extract_level(text: &str) -> LevelDetection {
    if let Some(level) = match_level_patterns(text) {
        return LevelDetection {
            level,
            confidence: LevelConfidence::High,
        };
    }
    if let Some(level) = extract_years(text).and_then(level_from_years) {
        return LevelDetection {
            level,
            confidence: LevelConfidence::Low,
        };
    }
    LevelDetection {
        level: RoleLevel::Mid,
        confidence: LevelConfidence::Low,
    }
}

/// Job-side level: the title is authoritative when it carries a pattern;
/// the description is consulted next, then the years fallback over both.
pub fn job_level(title: &str, description: &str) -> LevelDetection {
    if let Some(level) = match_level_patterns(title) {
        return LevelDetection {
            level,
            confidence: LevelConfidence::High,
        };
    }
    if let Some(level) = match_level_patterns(description) {
        return LevelDetection {
            level,
            confidence: LevelConfidence::High,
        };
    }
    if let Some(level) = extract_years(&format!("{}\n{}", title, description)).and_then(level_from_years)
    {
        return LevelDetection {
            level,
            confidence: LevelConfidence::Low,
        };
    }
    LevelDetection {
        level: RoleLevel::Mid,
        confidence: LevelConfidence::Low,
    }
}

static RE_CURRENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^.*\bcurrent(?:ly)?\b.*$").expect("current-line regex"));

/// Candidate-side level: prefer a detected "current position" line, else the
/// document prefix.
pub fn candidate_level(cv_text: &str) -> LevelDetection {
    if let Some(m) = RE_CURRENT_LINE.find(cv_text) {
        if let Some(level) = match_level_patterns(m.as_str()) {
            return LevelDetection {
                level,
                confidence: LevelConfidence::High,
            };
        }
    }
    let prefix: String = cv_text.chars().take(400).collect();
    extract_level(&prefix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progression {
    StepUp,
    Lateral,
    StepDown,
    SignificantStepDown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleLevelAnalysis {
    pub job_level: RoleLevel,
    pub job_confidence: LevelConfidence,
    pub candidate_level: RoleLevel,
    pub candidate_confidence: LevelConfidence,
    pub progression: Progression,
    /// Fixed band per direction: 95 / 85 / 60 / 30 / 10.
    pub growth_score: u8,
    pub explanation: String,
    pub recommendation: String,
}

/// Compare a posting's level against the candidate's and derive progression
/// direction, growth potential, and a recommendation.
pub fn analyze_role_level(title: &str, description: &str, cv_text: &str) -> RoleLevelAnalysis {
    let job = job_level(title, description);
    let cand = candidate_level(cv_text);
    let diff = job.level.rank() - cand.level.rank();

    let (progression, growth_score, explanation, recommendation) = match diff {
        d if d >= 2 => (
            Progression::StepUp,
            95,
            format!(
                "This {} role is a significant step up from your current {} level.",
                job.level.as_str(),
                cand.level.as_str()
            ),
            "Ambitious jump — lead with scope, ownership, and leadership evidence.".to_string(),
        ),
        1 => (
            Progression::StepUp,
            85,
            format!(
                "This {} role is one step up from your current {} level.",
                job.level.as_str(),
                cand.level.as_str()
            ),
            "Natural next step — a strong growth opportunity.".to_string(),
        ),
        0 => (
            Progression::Lateral,
            60,
            format!("This role matches your current {} level.", cand.level.as_str()),
            "Lateral move — weigh scope, domain, and compensation rather than title.".to_string(),
        ),
        -1 => (
            Progression::StepDown,
            30,
            format!(
                "This {} role sits one step below your current {} level.",
                job.level.as_str(),
                cand.level.as_str()
            ),
            "Step down — consider only for a domain switch or other strategic reasons."
                .to_string(),
        ),
        _ => (
            Progression::SignificantStepDown,
            10,
            format!(
                "This {} role sits well below your current {} level.",
                job.level.as_str(),
                cand.level.as_str()
            ),
            "Significant step down — likely a poor fit for career progression.".to_string(),
        ),
    };

    RoleLevelAnalysis {
        job_level: job.level,
        job_confidence: job.confidence,
        candidate_level: cand.level,
        candidate_confidence: cand.confidence,
        progression,
        growth_score,
        explanation,
        recommendation,
    }
}
