use std::env;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ErrorBody, SearchRequest, SearchResponse, WebResult};
use crate::http::snippet;

const API_BASE: &str = "https://api.tavily.com";

#[derive(Debug, thiserror::Error)]
pub enum TavilyError {
    #[error("TAVILY_API_KEY not set. Get one at https://app.tavily.com")]
    ApiKeyNotSet,

    #[error("Tavily rejected the API key: {0}")]
    Unauthorized(String),

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Returns up to `max_results` raw hits for a query.
pub trait WebSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, TavilyError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone, Debug)]
pub struct TavilyClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl TavilyClient {
    pub fn from_env(http: Client) -> Result<Self, TavilyError> {
        let api_key = env::var("TAVILY_API_KEY").map_err(|_| TavilyError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(TavilyError::ApiKeyNotSet);
        }
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("tvly-test".to_string()),
            base_url: base_url.to_string(),
        }
    }
}

impl WebSearch for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, TavilyError> {
        let url = format!("{}/search", self.base_url);

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&SearchRequest { query, max_results })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Tavily API rate limited");
            return Err(TavilyError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.detail)
                .map(|detail| detail.into_message())
                .unwrap_or_else(|| format!("HTTP {status}: {}", snippet(&text)));
            warn!(status = %status, "Tavily API error");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(TavilyError::Unauthorized(message));
            }
            return Err(TavilyError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        debug!(results = body.results.len(), "tavily search complete");
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_sends_query_and_cap() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-test"))
            .and(body_json(serde_json::json!({"query": "natural wine", "max_results": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": "natural wine",
                "results": [
                    {"title": "A", "url": "https://a.example", "content": "about A", "score": 0.9},
                    {"title": "B", "url": "https://b.example", "content": "about B", "score": 0.8}
                ],
                "response_time": 0.5
            })))
            .mount(&server)
            .await;

        let client = TavilyClient::with_base_url(Client::new(), &server.uri());
        let results = client.search("natural wine", 2).await.unwrap();

        assert_eq!(
            results,
            vec![
                WebResult {
                    url: "https://a.example".into(),
                    content: "about A".into()
                },
                WebResult {
                    url: "https://b.example".into(),
                    content: "about B".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn missing_results_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": "q"
            })))
            .mount(&server)
            .await;

        let client = TavilyClient::with_base_url(Client::new(), &server.uri());
        assert!(client.search("q", 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rate_limit_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = TavilyClient::with_base_url(Client::new(), &server.uri());
        assert!(matches!(client.search("q", 2).await, Err(TavilyError::RateLimited)));
    }

    #[tokio::test]
    async fn unauthorized_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": {"error": "Unauthorized: missing or invalid API key."}
            })))
            .mount(&server)
            .await;

        let client = TavilyClient::with_base_url(Client::new(), &server.uri());
        match client.search("q", 2).await {
            Err(TavilyError::Unauthorized(msg)) => assert!(msg.contains("invalid API key")),
            other => panic!("expected Unauthorized, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_snippeted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = TavilyClient::with_base_url(Client::new(), &server.uri());
        match client.search("q", 2).await {
            Err(TavilyError::Api { code: 502, message }) => assert!(message.contains("bad gateway")),
            other => panic!("expected Api(502), got: {other:?}"),
        }
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let client = TavilyClient::with_base_url(Client::new(), "http://localhost:0");
        let debug = format!("{client:?}");
        assert!(!debug.contains("tvly-test"));
        assert!(debug.contains("REDACTED"));
    }
}
