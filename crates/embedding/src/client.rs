use async_trait::async_trait;
use embedsearch_common::{AppConfig, EmbedSearchError, Result};
use reqwest::Client;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::types::{EmbedRequest, EmbedResponse};

/// Ollama embeddings API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaClient {
    /// Create new Ollama client
    ///
    /// No request timeout is set; callers wrap calls when they need one.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        let client = Client::builder()
            .build()
            .map_err(|e| EmbedSearchError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Ollama client initialized: {} (model={})", base_url, model);
        Ok(Self {
            base_url,
            model,
            client,
        })
    }

    /// Create client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.ollama_base_url, &config.embedding_model)
    }

    fn embeddings_url(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }

    /// Single attempt to generate embedding
    async fn try_embed(&self, url: &str, request: &EmbedRequest) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                EmbedSearchError::service_unavailable(format!("Failed to reach {}: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("<failed to read response body: {}>", e),
            };
            return Err(EmbedSearchError::service(status.as_u16(), body));
        }

        let bytes = response.bytes().await.map_err(|e| {
            EmbedSearchError::service_unavailable(format!("Failed to read embedding response: {}", e))
        })?;

        let result: EmbedResponse = serde_json::from_slice(&bytes).map_err(|e| {
            EmbedSearchError::decode(format!("Failed to parse embedding response: {}", e))
        })?;

        if result.embedding.is_empty() {
            return Err(EmbedSearchError::decode("Empty embedding from Ollama"));
        }

        Ok(result.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.embeddings_url();

        debug!("Generating embedding - Model: {}, Text length: {}", self.model, text.len());

        let request = EmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let embedding = self.try_embed(&url, &request).await?;
        debug!("Received embedding - Dimension: {}", embedding.len());
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
