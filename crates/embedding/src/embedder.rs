use async_trait::async_trait;
use embedsearch_common::Result;

/// Turns text into a fixed-dimension embedding vector
///
/// Each call is a single attempt; retry policy belongs to the caller.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Name of the model producing the embeddings
    fn model(&self) -> &str;
}
