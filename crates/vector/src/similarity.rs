use embedsearch_common::{EmbedSearchError, Result};

/// Compute cosine similarity between two vectors
///
/// Accumulates in `f64`. Returns `0.0` when either vector has zero norm.
/// Vectors of different lengths are rejected, never truncated or padded.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(EmbedSearchError::dimension_mismatch(a.len(), b.len()));
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    // sqrt of the product keeps cos(v, v) at exactly 1.0
    Ok(dot / (norm_a * norm_b).sqrt())
}

/// Cosine distance as pgvector's `<=>` defines it: `1 - cosine_similarity`
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f64> {
    cosine_similarity(a, b).map(|similarity| 1.0 - similarity)
}
