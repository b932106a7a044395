use std::env;
use std::time::Duration;

use reqwest::Client;

/// TCP connection establishment timeout. Only bounds the handshake to an
/// unreachable host; requests themselves have no deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared client for the embedding, vector store and web search backends.
///
/// No overall request timeout: a cold model load on the embedding host can
/// take minutes and the backends enforce their own limits.
pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder().connect_timeout(CONNECT_TIMEOUT).build()
}

/// Trimmed, non-empty value of `key`, or `default`.
pub(crate) fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// First 200 bytes of an error body, cut on a char boundary.
pub(crate) fn snippet(text: &str) -> &str {
    if text.len() > 200 {
        &text[..text.floor_char_boundary(200)]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn slow_backend_response_is_awaited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("ok")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let response = client.post(server.uri()).send().await.unwrap();
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let long = "가".repeat(100);
        let s = snippet(&long);
        assert!(s.len() <= 200);
        assert!(s.chars().all(|c| c == '가'));
    }

    #[test]
    fn short_snippet_is_whole_text() {
        assert_eq!(snippet("not json"), "not json");
    }

    #[test]
    fn env_or_falls_back_for_unset_key() {
        assert_eq!(env_or("CONCIERGE_TEST_UNSET_VARIABLE", "fallback"), "fallback");
    }
}
