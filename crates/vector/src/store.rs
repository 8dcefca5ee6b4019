use async_trait::async_trait;
use embedsearch_common::Result;

use crate::types::{Candidate, DocumentId};

/// Default store distance threshold for candidate queries
pub const DEFAULT_MAX_DISTANCE: f64 = 0.5;

/// Persists (text, embedding) pairs and ranks them by native distance
///
/// Implementations must be safe to share across concurrent callers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document in a single atomic statement
    async fn insert(&self, text: &str, embedding: &[f32]) -> Result<DocumentId>;

    /// All documents with `distance <= max_distance`, ascending by distance
    async fn query_candidates(
        &self,
        query_embedding: &[f32],
        max_distance: f64,
    ) -> Result<Vec<Candidate>>;

    /// Number of stored documents
    async fn count(&self) -> Result<u64>;
}
