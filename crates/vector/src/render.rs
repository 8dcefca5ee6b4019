use crate::types::{DocumentId, QueryOutcome};

/// Confirmation line printed after a successful insert
pub fn insert_confirmation(id: DocumentId) -> String {
    format!("Text inserted successfully (id {}).", id)
}

/// Render a query outcome as a ranked listing
///
/// Rows keep store order. Each line shows the store's similarity next to the
/// recomputed one; rows past the divergence tolerance are marked.
pub fn render_outcome(outcome: &QueryOutcome) -> String {
    let mut lines = Vec::with_capacity(outcome.results.len() + outcome.row_errors.len() + 1);

    if outcome.results.is_empty() {
        lines.push("No similar texts found.".to_string());
    } else {
        lines.push("Similar texts:".to_string());
        for (rank, result) in outcome.results.iter().enumerate() {
            let marker = if result.divergent { " [divergent]" } else { "" };
            lines.push(format!(
                "{:02} - ID: {:04} | Similarity: {:.4} | Verified: {:.4} | Text: {}{}",
                rank + 1,
                result.document_id,
                result.store_similarity,
                result.verified_similarity,
                result.text,
                marker
            ));
        }
    }

    for row_error in &outcome.row_errors {
        lines.push(format!(
            "!! - ID: {:04} | skipped: {}",
            row_error.document_id, row_error.message
        ));
    }

    lines.join("\n")
}
