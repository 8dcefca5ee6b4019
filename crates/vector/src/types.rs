use serde::{Deserialize, Serialize};

/// Store-assigned document identifier
pub type DocumentId = i64;

/// Stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned id
    pub id: DocumentId,

    /// Original text
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// Candidate row returned by a store query, before verification
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: DocumentId,
    pub text: String,

    /// Native distance reported by the store (lower is closer)
    pub store_distance: f64,

    /// Stored embedding in its raw literal form
    pub raw_embedding: String,
}

/// Candidate that passed decoding and verification
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityResult {
    pub document_id: DocumentId,
    pub text: String,
    pub store_distance: f64,

    /// `1 - store_distance`
    pub store_similarity: f64,

    /// Cosine similarity recomputed from the decoded stored vector
    pub verified_similarity: f64,

    /// Store and verified similarity disagree beyond tolerance
    pub divergent: bool,
}

/// Candidate skipped because its stored vector could not be verified
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub document_id: DocumentId,
    pub message: String,
}

/// Outcome of one query
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOutcome {
    /// Verified results in store order (ascending distance)
    pub results: Vec<SimilarityResult>,

    /// Rows skipped during verification
    pub row_errors: Vec<RowError>,
}

impl QueryOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn divergent_count(&self) -> usize {
        self.results.iter().filter(|r| r.divergent).count()
    }
}
