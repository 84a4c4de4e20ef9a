// src/matching/similarity.rs
//! Vector similarity for embedding-based scoring backends. The keyword
//! matcher does not need it; a future semantic matcher will.

use anyhow::{bail, Result};

/// Cosine similarity of two equal-length vectors.
///
/// A length mismatch is an explicit error: callers must not be able to
/// conflate malformed input with the valid zero-similarity result. Zero
/// vectors compare as `Ok(0.0)`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        bail!("vector length mismatch: {} vs {}", a.len(), b.len());
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
