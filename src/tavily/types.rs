use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub max_results: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<WebResult>,
}

/// One raw search hit. Tavily also sends `title` and `score`, which are unused.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebResult {
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Object { error: String },
    Text(String),
}

impl ErrorDetail {
    pub fn into_message(self) -> String {
        match self {
            ErrorDetail::Object { error } => error,
            ErrorDetail::Text(text) => text,
        }
    }
}
