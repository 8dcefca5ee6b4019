//! pgvector text literal codec: `[v1,v2,...,vN]`.

use embedsearch_common::{EmbedSearchError, Result};

/// Render a vector as a pgvector literal
///
/// Components use the shortest decimal form that parses back to the same `f32`.
pub fn encode(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 12 + 2);
    out.push('[');
    for (i, value) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&value.to_string());
    }
    out.push(']');
    out
}

/// Parse a pgvector literal back into a vector
pub fn decode(raw: &str) -> Result<Vec<f32>> {
    let inner = raw
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            EmbedSearchError::malformed_vector(format!(
                "expected [..] delimiters, got {:?}",
                preview(raw)
            ))
        })?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|token| {
            let token = token.trim();
            match token.parse::<f32>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(EmbedSearchError::malformed_vector(format!(
                    "invalid component {:?}",
                    token
                ))),
            }
        })
        .collect()
}

/// Decode raw column bytes (UTF-8 text form)
pub fn decode_bytes(raw: &[u8]) -> Result<Vec<f32>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| EmbedSearchError::malformed_vector(format!("not UTF-8: {}", e)))?;
    decode(text)
}

fn preview(raw: &str) -> String {
    raw.chars().take(32).collect()
}
