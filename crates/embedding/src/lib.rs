//! EmbedSearch Embedding Client
//!
//! Ollama embeddings API client and the `Embedder` capability

mod client;
mod embedder;
pub mod testing;
mod types;

pub use client::OllamaClient;
pub use embedder::Embedder;
pub use types::{EmbedRequest, EmbedResponse};
