//! In-process document store.
//!
//! Uses cosine distance as its native operator, hands back the stored literal
//! exactly like the PostgreSQL backend does, and lets callers overwrite a
//! row's literal to simulate on-disk corruption.

use async_trait::async_trait;
use embedsearch_common::{EmbedSearchError, Result};
use tokio::sync::RwLock;
use tracing::debug;

use crate::codec;
use crate::similarity::cosine_distance;
use crate::store::DocumentStore;
use crate::types::{Candidate, Document, DocumentId};

struct StoredRow {
    document: Document,
    raw_embedding: String,
}

#[derive(Default)]
struct MemoryState {
    rows: Vec<StoredRow>,
    next_id: DocumentId,
    dimension: Option<usize>,
}

/// Document store held in memory
#[derive(Default)]
pub struct MemoryDocumentStore {
    state: RwLock<MemoryState>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the embedding dimension up front instead of on first insert
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                dimension: Some(dimension),
                ..MemoryState::default()
            }),
        }
    }

    /// Replace the stored literal of a row, leaving its native vector intact
    pub async fn corrupt_raw(&self, id: DocumentId, raw: impl Into<String>) -> Result<()> {
        let mut state = self.state.write().await;
        let row = state
            .rows
            .iter_mut()
            .find(|row| row.document.id == id)
            .ok_or_else(|| EmbedSearchError::persistence(format!("no document with id {}", id)))?;
        row.raw_embedding = raw.into();
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, text: &str, embedding: &[f32]) -> Result<DocumentId> {
        let mut state = self.state.write().await;

        match state.dimension {
            Some(dimension) if dimension != embedding.len() => {
                return Err(EmbedSearchError::persistence(format!(
                    "expected {} dimensions, not {}",
                    dimension,
                    embedding.len()
                )));
            }
            Some(_) => {}
            None => state.dimension = Some(embedding.len()),
        }

        state.next_id += 1;
        let id = state.next_id;
        state.rows.push(StoredRow {
            document: Document {
                id,
                text: text.to_string(),
                embedding: embedding.to_vec(),
            },
            raw_embedding: codec::encode(embedding),
        });

        debug!("Stored document {} in memory", id);
        Ok(id)
    }

    async fn query_candidates(
        &self,
        query_embedding: &[f32],
        max_distance: f64,
    ) -> Result<Vec<Candidate>> {
        let state = self.state.read().await;

        let mut candidates = Vec::new();
        for row in &state.rows {
            let distance = cosine_distance(&row.document.embedding, query_embedding)
                .map_err(|e| EmbedSearchError::persistence(format!("distance failed: {}", e)))?;
            if distance <= max_distance {
                candidates.push(Candidate {
                    id: row.document.id,
                    text: row.document.text.clone(),
                    store_distance: distance,
                    raw_embedding: row.raw_embedding.clone(),
                });
            }
        }

        candidates.sort_by(|a, b| {
            a.store_distance
                .total_cmp(&b.store_distance)
                .then(a.id.cmp(&b.id))
        });

        Ok(candidates)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.state.read().await.rows.len() as u64)
    }
}
