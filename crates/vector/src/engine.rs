use std::future::Future;
use std::sync::Arc;

use embedsearch_common::{AppConfig, EmbedSearchError, Result};
use embedsearch_embedding::Embedder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec;
use crate::similarity::cosine_similarity;
use crate::store::{DocumentStore, DEFAULT_MAX_DISTANCE};
use crate::types::{Candidate, DocumentId, QueryOutcome, RowError, SimilarityResult};

/// Query tuning knobs
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOptions {
    /// Largest store distance a candidate may have
    pub max_distance: f64,

    /// Cap on verified results (store order preserved)
    pub max_results: Option<usize>,

    /// Gap between store and verified similarity that counts as divergence
    pub divergence_tolerance: f64,

    /// Required embedding dimension, if pinned
    pub embedding_dim: Option<usize>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            max_results: None,
            divergence_tolerance: 0.001,
            embedding_dim: None,
        }
    }
}

impl RetrievalOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_distance: config.max_distance,
            max_results: config.max_results,
            divergence_tolerance: config.divergence_tolerance,
            embedding_dim: config.embedding_dim,
        }
    }
}

/// Embeds text, persists it, and answers similarity queries
///
/// Holds no per-query state; one engine can serve concurrent callers.
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    options: RetrievalOptions,
    cancel: CancellationToken,
}

impl RetrievalEngine {
    /// Create new retrieval engine
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        options: RetrievalOptions,
    ) -> Self {
        info!(
            "Retrieval engine initialized - model={}, max_distance={}, max_results={:?}",
            embedder.model(),
            options.max_distance,
            options.max_results
        );

        Self {
            embedder,
            store,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort in-flight external calls when `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Embed `text` and store it
    pub async fn insert(&self, text: &str) -> Result<DocumentId> {
        info!("Inserting text ({} bytes)", text.len());

        let embedding = self.embed(text).await?;
        let id = self.guard(self.store.insert(text, &embedding)).await?;

        info!("Document inserted: {}", id);
        Ok(id)
    }

    /// Embed `text` and rank stored documents against it
    pub async fn query(&self, text: &str) -> Result<QueryOutcome> {
        debug!(
            "Querying for: {} (max_distance={})",
            text, self.options.max_distance
        );

        let query_embedding = self.embed(text).await?;
        let candidates = self
            .guard(
                self.store
                    .query_candidates(&query_embedding, self.options.max_distance),
            )
            .await?;
        let total_candidates = candidates.len();

        let outcome = self.verify(&query_embedding, candidates);

        info!(
            "Query completed - {} results, {} skipped, {} divergent (from {} candidates)",
            outcome.results.len(),
            outcome.row_errors.len(),
            outcome.divergent_count(),
            total_candidates
        );
        Ok(outcome)
    }

    /// Recompute similarity for each candidate from its decoded stored vector
    ///
    /// A candidate that fails to decode or has the wrong dimension is reported
    /// and skipped; the rest are kept in store order.
    pub fn verify(&self, query_embedding: &[f32], candidates: Vec<Candidate>) -> QueryOutcome {
        let mut outcome = QueryOutcome::default();

        for candidate in candidates {
            if let Some(limit) = self.options.max_results {
                if outcome.results.len() >= limit {
                    break;
                }
            }

            let verified = codec::decode(&candidate.raw_embedding)
                .and_then(|embedding| cosine_similarity(query_embedding, &embedding));

            let verified_similarity = match verified {
                Ok(similarity) => similarity,
                Err(e) => {
                    warn!("Skipping document {}: {}", candidate.id, e);
                    outcome.row_errors.push(RowError {
                        document_id: candidate.id,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let store_similarity = 1.0 - candidate.store_distance;
            let divergent =
                (store_similarity - verified_similarity).abs() > self.options.divergence_tolerance;
            if divergent {
                warn!(
                    "Document {}: store similarity {:.6} differs from verified {:.6}",
                    candidate.id, store_similarity, verified_similarity
                );
            }

            outcome.results.push(SimilarityResult {
                document_id: candidate.id,
                text: candidate.text,
                store_distance: candidate.store_distance,
                store_similarity,
                verified_similarity,
                divergent,
            });
        }

        outcome
    }

    /// Number of stored documents
    pub async fn document_count(&self) -> Result<u64> {
        self.guard(self.store.count()).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.guard(self.embedder.embed(text)).await?;

        if let Some(expected) = self.options.embedding_dim {
            if embedding.len() != expected {
                return Err(EmbedSearchError::dimension_mismatch(expected, embedding.len()));
            }
        }

        Ok(embedding)
    }

    /// Race an external call against cancellation
    async fn guard<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(EmbedSearchError::Cancelled),
            result = call => result,
        }
    }
}
