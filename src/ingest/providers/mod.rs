// src/ingest/providers/mod.rs
pub mod ashby;
pub mod custom;
pub mod greenhouse;
pub mod lever;
pub mod smartrecruiters;
pub mod workday;

use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};

/// Parse a provider RFC3339 timestamp into unix seconds. Providers treat a
/// missing or unparseable timestamp as absent, never as an error.
pub(crate) fn parse_rfc3339_to_unix(ts: &str) -> Option<u64> {
    OffsetDateTime::parse(ts, &Rfc3339)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

/// Scheme + host of a URL, without any path. Used to reach a provider's API
/// origin from a configured careers page URL.
pub(crate) fn url_origin(url: &str) -> Option<String> {
    let scheme_end = url.find("://")?;
    let rest = &url[scheme_end + 3..];
    let host_end = rest.find('/').unwrap_or(rest.len());
    if rest[..host_end].is_empty() {
        return None;
    }
    Some(format!("{}{}", &url[..scheme_end + 3], &rest[..host_end]))
}
