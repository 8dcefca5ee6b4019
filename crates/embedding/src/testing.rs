//! Deterministic embedder for tests.
//!
//! `MockEmbedder` derives a stable vector from a SHA-256 digest of the text,
//! so identical text always embeds identically. Individual texts can be pinned
//! to explicit vectors, and failures can be scripted to exercise error paths
//! without a running model service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use embedsearch_common::{EmbedSearchError, Result};
use sha2::{Digest, Sha256};

use crate::embedder::Embedder;

/// Failure the mock returns instead of an embedding.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Behaves like a refused connection.
    Unavailable,
    /// Behaves like a non-success HTTP status.
    Status(u16, String),
    /// Behaves like an unparseable response.
    Decode,
}

impl MockFailure {
    fn to_error(&self) -> EmbedSearchError {
        match self {
            Self::Unavailable => EmbedSearchError::service_unavailable("mock embedder offline"),
            Self::Status(status, body) => EmbedSearchError::service(*status, body.clone()),
            Self::Decode => EmbedSearchError::decode("mock embedder returned garbage"),
        }
    }
}

/// A deterministic in-process embedder.
pub struct MockEmbedder {
    dimension: usize,
    pinned: Mutex<HashMap<String, Vec<f32>>>,
    failure: Mutex<Option<MockFailure>>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    /// Create a mock producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            pinned: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Pin `text` to an explicit vector.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.pin(text, embedding);
        self
    }

    /// Pin `text` to an explicit vector after construction.
    pub fn pin(&self, text: impl Into<String>, embedding: Vec<f32>) {
        self.pinned
            .lock()
            .expect("pinned embeddings lock poisoned")
            .insert(text.into(), embedding);
    }

    /// Make every following call fail (or succeed again with `None`).
    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.lock().expect("failure lock poisoned") = failure;
    }

    /// Number of `embed` calls so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Deterministic vector for `text`.
    pub fn hashed_embedding(&self, text: &str) -> Vec<f32> {
        (0..self.dimension)
            .map(|i| {
                let mut hasher = Sha256::new();
                hasher.update(text.as_bytes());
                hasher.update((i as u64).to_le_bytes());
                let digest = hasher.finalize();
                let raw = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
                // Map into [-1, 1]
                (raw as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(failure) = self.failure.lock().expect("failure lock poisoned").as_ref() {
            return Err(failure.to_error());
        }

        if let Some(embedding) = self.pinned.lock().expect("pinned embeddings lock poisoned").get(text) {
            return Ok(embedding.clone());
        }

        Ok(self.hashed_embedding(text))
    }

    fn model(&self) -> &str {
        "mock"
    }
}
