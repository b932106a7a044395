use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct CreateCollectionRequest<'a> {
    pub name: &'a str,
    pub get_or_create: bool,
}

#[derive(Debug, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query_embeddings: Vec<Vec<f32>>,
    pub n_results: usize,
    pub include: &'a [&'a str],
}

/// Chroma returns one inner list per query embedding; only one is ever sent.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: Option<String>,
    pub message: Option<String>,
}
