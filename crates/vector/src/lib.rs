//! EmbedSearch Vector Retrieval
//!
//! pgvector literal codec, cosine similarity, document stores and the
//! retrieval engine that cross-checks store ranking against recomputed scores

pub mod codec;
mod engine;
pub mod memory;
mod pg;
pub mod render;
pub mod similarity;
mod store;
mod types;

pub use engine::{RetrievalEngine, RetrievalOptions};
pub use memory::MemoryDocumentStore;
pub use pg::{map_sqlx_error, PgDocumentStore};
pub use similarity::cosine_similarity;
pub use store::{DocumentStore, DEFAULT_MAX_DISTANCE};
pub use types::{Candidate, Document, DocumentId, QueryOutcome, RowError, SimilarityResult};
