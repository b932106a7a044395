//! The restaurant retrieval tools: menu search, wine search and web search.
//!
//! Every tool returns at least one document. An empty lookup is replaced by a
//! fixed "not found" placeholder; backend failures are returned as-is.

use clap::ValueEnum;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chroma::{ChromaClient, ChromaCollection, StoreError, VectorStore};
use crate::document::{Document, with_fallback};
use crate::ollama::OllamaEmbeddings;
use crate::tavily::{TavilyClient, TavilyError, WebResult, WebSearch};

pub const MENU_COLLECTION: &str = "restaurant_menu";
pub const WINE_COLLECTION: &str = "restaurant_wine";

/// Matches returned per store-backed query.
pub const STORE_TOP_K: usize = 2;
/// Hits requested from, and kept of, each web search.
pub const WEB_MAX_RESULTS: usize = 2;

pub const MENU_NOT_FOUND: &str = "관련 메뉴 정보를 찾을 수 없습니다.";
pub const WINE_NOT_FOUND: &str = "관련 와인 정보를 찾을 수 없습니다.";
pub const WEB_NOT_FOUND: &str = "관련 정보를 찾을 수 없습니다.";

/// The retrieval tools in the order they are offered to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tool {
    Menu,
    Wine,
    Web,
}

pub const TOOLS: [Tool; 3] = [Tool::Menu, Tool::Wine, Tool::Web];

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Menu => "search_menu",
            Tool::Wine => "search_wine",
            Tool::Web => "search_web",
        }
    }
}

pub async fn search_menu(store: &impl VectorStore, query: &str) -> Result<Vec<Document>, StoreError> {
    let docs = store.similarity_search(query, STORE_TOP_K).await?;
    Ok(with_fallback(docs, MENU_NOT_FOUND))
}

pub async fn search_wine(store: &impl VectorStore, query: &str) -> Result<Vec<Document>, StoreError> {
    let docs = store.similarity_search(query, STORE_TOP_K).await?;
    Ok(with_fallback(docs, WINE_NOT_FOUND))
}

pub async fn search_web(web: &impl WebSearch, query: &str) -> Result<Vec<Document>, TavilyError> {
    let docs = web
        .search(query, WEB_MAX_RESULTS)
        .await?
        .into_iter()
        .take(WEB_MAX_RESULTS)
        .map(web_document)
        .collect();
    Ok(with_fallback(docs, WEB_NOT_FOUND))
}

/// Wrap a web hit so its source URL travels with the text.
fn web_document(result: WebResult) -> Document {
    Document::new(format!(
        "<Document href=\"{}\"/>\n{}\n</Document>",
        result.url, result.content
    ))
    .with_metadata("source", "web search")
    .with_metadata("url", result.url)
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Web(#[from] TavilyError),
}

/// Backends shared by the retrieval tools, built once at startup.
///
/// Both collections share a single embedding client. Web search is absent
/// when `TAVILY_API_KEY` is not configured.
#[derive(Clone, Debug)]
pub struct Retrieval {
    menu: ChromaCollection<OllamaEmbeddings>,
    wine: ChromaCollection<OllamaEmbeddings>,
    web: Option<TavilyClient>,
}

impl Retrieval {
    pub fn from_env(http: Client) -> Self {
        let embeddings = Arc::new(OllamaEmbeddings::from_env(http.clone()));
        let chroma = ChromaClient::from_env(http.clone());
        let web = TavilyClient::from_env(http)
            .inspect_err(|e| warn!("web search not available: {e}"))
            .ok();
        info!(model = %embeddings.model(), "retrieval backends configured");
        Self::new(chroma, embeddings, web)
    }

    pub fn new(
        chroma: ChromaClient,
        embeddings: Arc<OllamaEmbeddings>,
        web: Option<TavilyClient>,
    ) -> Self {
        Self {
            menu: chroma.collection(MENU_COLLECTION, Arc::clone(&embeddings)),
            wine: chroma.collection(WINE_COLLECTION, embeddings),
            web,
        }
    }

    pub async fn search_menu(&self, query: &str) -> Result<Vec<Document>, StoreError> {
        search_menu(&self.menu, query).await
    }

    pub async fn search_wine(&self, query: &str) -> Result<Vec<Document>, StoreError> {
        search_wine(&self.wine, query).await
    }

    pub async fn search_web(&self, query: &str) -> Result<Vec<Document>, TavilyError> {
        let web = self.web.as_ref().ok_or(TavilyError::ApiKeyNotSet)?;
        search_web(web, query).await
    }

    pub async fn run(&self, tool: Tool, query: &str) -> Result<Vec<Document>, RetrievalError> {
        info!(tool = tool.name(), query, "retrieval");
        let docs = match tool {
            Tool::Menu => self.search_menu(query).await?,
            Tool::Wine => self.search_wine(query).await?,
            Tool::Web => self.search_web(query).await?,
        };
        Ok(docs)
    }
}
