use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::types::{ApiError, Collection, CreateCollectionRequest, QueryRequest, QueryResponse};
use crate::document::Document;
use crate::http::{env_or, snippet};
use crate::ollama::{EmbedError, Embedder};

const DEFAULT_URL: &str = "http://localhost:8000";
const DEFAULT_TENANT: &str = "default_tenant";
const DEFAULT_DATABASE: &str = "default_database";
const QUERY_INCLUDE: &[&str] = &["documents", "metadatas"];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("Chroma API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Top-k nearest-neighbour lookup over stored documents.
pub trait VectorStore {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, StoreError>;
}

/// Connection settings for a Chroma server, shared by every collection handle.
#[derive(Clone, Debug)]
pub struct ChromaClient {
    http: Client,
    base_url: String,
    tenant: String,
    database: String,
}

impl ChromaClient {
    /// Reads `CHROMA_URL`, `CHROMA_TENANT` and `CHROMA_DATABASE`.
    pub fn from_env(http: Client) -> Self {
        let mut client = Self::with_base_url(http, &env_or("CHROMA_URL", DEFAULT_URL));
        client.tenant = env_or("CHROMA_TENANT", DEFAULT_TENANT);
        client.database = env_or("CHROMA_DATABASE", DEFAULT_DATABASE);
        client
    }

    pub fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tenant: DEFAULT_TENANT.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Handle to a named collection; the collection is created on first query
    /// if it does not exist yet.
    pub fn collection<E: Embedder>(&self, name: &str, embedder: Arc<E>) -> ChromaCollection<E> {
        ChromaCollection {
            client: self.clone(),
            name: name.to_string(),
            id: Arc::new(OnceCell::new()),
            embedder,
        }
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self
            .http
            .post(url)
            .header("User-Agent", crate::USER_AGENT)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&text)
                .ok()
                .and_then(|e| e.message.or(e.error))
                .unwrap_or_else(|| snippet(&text).to_string());
            warn!(status = %status, url, "Chroma API error");
            return Err(StoreError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[derive(Clone, Debug)]
pub struct ChromaCollection<E> {
    client: ChromaClient,
    name: String,
    id: Arc<OnceCell<String>>,
    embedder: Arc<E>,
}

impl<E> ChromaCollection<E> {
    async fn collection_id(&self) -> Result<&str, StoreError> {
        let id = self
            .id
            .get_or_try_init(|| async {
                let request = CreateCollectionRequest {
                    name: &self.name,
                    get_or_create: true,
                };
                let collection: Collection = self
                    .client
                    .post_json(&self.client.collections_url(), &request)
                    .await?;
                debug!(name = %collection.name, id = %collection.id, "collection resolved");
                Ok::<_, StoreError>(collection.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

impl<E: Embedder> VectorStore for ChromaCollection<E> {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, StoreError> {
        let embedding = self.embedder.embed_query(query).await?;
        let id = self.collection_id().await?;

        let url = format!("{}/{id}/query", self.client.collections_url());
        let request = QueryRequest {
            query_embeddings: vec![embedding],
            n_results: k,
            include: QUERY_INCLUDE,
        };
        let response: QueryResponse = self.client.post_json(&url, &request).await?;
        let docs = into_documents(response);

        debug!(collection = %self.name, matches = docs.len(), "similarity search complete");
        Ok(docs)
    }
}

fn into_documents(response: QueryResponse) -> Vec<Document> {
    let count = response.ids.first().map_or(0, Vec::len);
    let mut contents = response
        .documents
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default()
        .into_iter();
    let mut metadatas = response
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default()
        .into_iter();

    (0..count)
        .map(|_| Document {
            content: contents.next().flatten().unwrap_or_default(),
            metadata: metadatas.next().flatten().unwrap_or_default(),
        })
        .collect()
}
