use reqwest::Client;
use tracing::{debug, warn};

use super::types::{EmbedRequest, EmbedResponse};
use crate::http::{env_or, snippet};

const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "bge-m3";

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding model '{0}' not available on Ollama server")]
    ModelNotFound(String),

    #[error("Ollama API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Ollama returned no embedding")]
    Empty,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Turns query text into a vector for similarity search.
pub trait Embedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

#[derive(Clone, Debug)]
pub struct OllamaEmbeddings {
    http: Client,
    model: String,
    base_url: String,
}

impl OllamaEmbeddings {
    /// Reads `OLLAMA_HOST` and `EMBEDDING_MODEL`, falling back to a local
    /// server and `bge-m3`.
    pub fn from_env(http: Client) -> Self {
        let base_url = env_or("OLLAMA_HOST", DEFAULT_HOST);
        let model = env_or("EMBEDDING_MODEL", DEFAULT_MODEL);
        Self::with_base_url(http, &base_url, &model)
    }

    pub fn with_base_url(http: Client, base_url: &str, model: &str) -> Self {
        Self {
            http,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Embedder for OllamaEmbeddings {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<EmbedResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| snippet(&text).to_string());
            if status == reqwest::StatusCode::NOT_FOUND {
                warn!(model = %self.model, "embedding model not found");
                return Err(EmbedError::ModelNotFound(self.model.clone()));
            }
            warn!(status = %status, "Ollama API error");
            return Err(EmbedError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: EmbedResponse = response.json().await?;
        let embedding = body.embeddings.into_iter().next().ok_or(EmbedError::Empty)?;
        debug!(model = %self.model, dims = embedding.len(), "query embedded");
        Ok(embedding)
    }
}
