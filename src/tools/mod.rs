mod errors;
mod params;

pub use params::{LoadPdfParams, QueryParams};

use std::path::PathBuf;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use tracing::info;

use errors::{pdf_to_mcp_error, store_to_mcp_error, tavily_to_mcp_error};

use crate::document::Document;
use crate::pdf;
use crate::retrieval::{Retrieval, TOOLS};

/// MCP server handler exposing the retrieval tools and PDF intake.
///
/// Configuration via environment variables:
/// - `OLLAMA_HOST`, `EMBEDDING_MODEL`: query embeddings (default local `bge-m3`)
/// - `CHROMA_URL`, `CHROMA_TENANT`, `CHROMA_DATABASE`: vector store
/// - `TAVILY_API_KEY`: enables `search_web` (optional)
#[derive(Clone)]
pub struct Concierge {
    retrieval: Retrieval,
    copy_dir: PathBuf,
    tool_router: ToolRouter<Self>,
}

#[derive(Serialize)]
struct LoadPdfSummary {
    resolved_path: String,
    pages: usize,
}

#[tool_router]
impl Concierge {
    pub fn new(retrieval: Retrieval, copy_dir: PathBuf) -> Self {
        Self {
            retrieval,
            copy_dir,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "search_menu",
        description = "Securely retrieve and access authorized restaurant menu information from the encrypted database. Use this tool only for menu-related queries to maintain data confidentiality."
    )]
    async fn search_menu(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        require_query(&params.query)?;
        info!(query = %params.query, "tool:search_menu");

        let docs = self
            .retrieval
            .search_menu(&params.query)
            .await
            .map_err(store_to_mcp_error)?;
        documents_result(&docs)
    }

    #[tool(
        name = "search_wine",
        description = "Securely retrieve and access authorized restaurant wine information from the encrypted database. Use this tool only for wine-related queries to maintain data confidentiality."
    )]
    async fn search_wine(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        require_query(&params.query)?;
        info!(query = %params.query, "tool:search_wine");

        let docs = self
            .retrieval
            .search_wine(&params.query)
            .await
            .map_err(store_to_mcp_error)?;
        documents_result(&docs)
    }

    #[tool(
        name = "search_web",
        description = "Searches the internet for information that does not exist in the database or for the latest information."
    )]
    async fn search_web(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        require_query(&params.query)?;
        info!(query = %params.query, "tool:search_web");

        let docs = self
            .retrieval
            .search_web(&params.query)
            .await
            .map_err(tavily_to_mcp_error)?;
        documents_result(&docs)
    }

    #[tool(
        name = "load_pdf",
        description = "Load a local PDF file page by page. File names containing Korean (Hangul) are first copied to an ASCII-only name in the copy directory. Returns the path that was loaded and its page count."
    )]
    async fn load_pdf(
        &self,
        Parameters(params): Parameters<LoadPdfParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.path.is_empty() {
            return Err(McpError::invalid_params("path must not be empty", None));
        }
        info!(path = %params.path, "tool:load_pdf");

        let copy_dir = params
            .copy_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| self.copy_dir.clone());
        let path = params.path;
        let loaded = tokio::task::spawn_blocking(move || pdf::normalize_and_load(path, copy_dir))
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .map_err(pdf_to_mcp_error)?;

        let summary = LoadPdfSummary {
            resolved_path: loaded.resolved_path.display().to_string(),
            pages: loaded.pages.len(),
        };
        json_result(&summary)
    }
}

#[tool_handler]
impl ServerHandler for Concierge {
    fn get_info(&self) -> ServerInfo {
        let tools: Vec<_> = TOOLS.iter().map(|t| t.name()).collect();
        ServerInfo {
            server_info: Implementation {
                name: "concierge".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(format!(
                "concierge answers restaurant questions with {} (in that order of preference), and loads PDFs with load_pdf.",
                tools.join(", ")
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn require_query(query: &str) -> Result<(), McpError> {
    if query.trim().is_empty() {
        return Err(McpError::invalid_params("query must not be empty", None));
    }
    Ok(())
}

fn documents_result(docs: &[Document]) -> Result<CallToolResult, McpError> {
    info!(documents = docs.len(), "retrieval complete");
    json_result(docs)
}

fn json_result<T: Serialize + ?Sized>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
