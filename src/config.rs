// src/config.rs
//! Service configuration from environment variables, and the company roster
//! from a TOML/JSON file. The roster is read-only to the pipeline.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::Company;

const ENV_COMPANIES_PATH: &str = "COMPANIES_PATH";
const ENV_POLL_INTERVAL: &str = "POLL_INTERVAL_SECS";
const ENV_EXPIRY_THRESHOLD: &str = "EXPIRY_THRESHOLD";
const ENV_BIND_ADDR: &str = "BIND_ADDR";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1800;
pub const DEFAULT_EXPIRY_THRESHOLD: u32 = 3;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub poll_interval_secs: u64,
    pub expiry_threshold: u32,
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            expiry_threshold: DEFAULT_EXPIRY_THRESHOLD,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Build from env vars; anything absent or unparseable falls back to a
    /// sane default.
    pub fn from_env() -> Self {
        let poll_interval_secs = std::env::var(ENV_POLL_INTERVAL)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v >= 60)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let expiry_threshold = std::env::var(ENV_EXPIRY_THRESHOLD)
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v >= 1)
            .unwrap_or(DEFAULT_EXPIRY_THRESHOLD);

        let bind_addr = std::env::var(ENV_BIND_ADDR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Self {
            poll_interval_secs,
            expiry_threshold,
            bind_addr,
        }
    }
}

/// Load the roster from an explicit path. Supports TOML or JSON.
pub fn load_companies_from(path: &Path) -> Result<Vec<Company>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading companies from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_companies(&content, ext.as_str())
}

/// Load the roster using env var + fallbacks:
/// 1) $COMPANIES_PATH
/// 2) config/companies.toml
/// 3) config/companies.json
pub fn load_companies_default() -> Result<Vec<Company>> {
    if let Ok(p) = std::env::var(ENV_COMPANIES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_companies_from(&pb);
        } else {
            return Err(anyhow!("COMPANIES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/companies.toml");
    if toml_p.exists() {
        return load_companies_from(&toml_p);
    }
    let json_p = PathBuf::from("config/companies.json");
    if json_p.exists() {
        return load_companies_from(&json_p);
    }
    Ok(Vec::new())
}

fn parse_companies(s: &str, hint_ext: &str) -> Result<Vec<Company>> {
    let try_toml = hint_ext == "toml" || s.contains("[[companies]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported companies format"))
}

fn parse_toml(s: &str) -> Result<Vec<Company>> {
    #[derive(serde::Deserialize)]
    struct TomlRoster {
        companies: Vec<Company>,
    }
    let v: TomlRoster = toml::from_str(s)?;
    Ok(clean_roster(v.companies))
}

fn parse_json(s: &str) -> Result<Vec<Company>> {
    let v: Vec<Company> = serde_json::from_str(s)?;
    Ok(clean_roster(v))
}

/// Trim names, drop empty entries, dedup by case-insensitive name (first
/// occurrence wins).
fn clean_roster(items: Vec<Company>) -> Vec<Company> {
    use std::collections::HashSet;
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for mut c in items {
        c.name = c.name.trim().to_string();
        if c.name.is_empty() {
            continue;
        }
        if seen.insert(c.name.to_lowercase()) {
            out.push(c);
        }
    }
    out
}
