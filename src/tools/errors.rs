use rmcp::ErrorData as McpError;

use crate::chroma::StoreError;
use crate::ollama::EmbedError;
use crate::pdf::PdfError;
use crate::tavily::TavilyError;

pub(super) fn retriable_error(e: &impl std::fmt::Display) -> McpError {
    McpError::internal_error(format!("{e} (retriable)"), None)
}

pub(super) fn store_to_mcp_error(e: StoreError) -> McpError {
    match &e {
        StoreError::Embed(EmbedError::ModelNotFound(model)) => McpError::internal_error(
            format!("{e} — run `ollama pull {model}` on the embedding host"),
            None,
        ),
        StoreError::Api { code: 429, .. } | StoreError::Api { code: 500..=599, .. } => {
            retriable_error(&e)
        }
        _ => McpError::internal_error(e.to_string(), None),
    }
}

pub(super) fn tavily_to_mcp_error(e: TavilyError) -> McpError {
    match &e {
        TavilyError::ApiKeyNotSet | TavilyError::Unauthorized(_) => {
            McpError::invalid_params(e.to_string(), None)
        }
        TavilyError::RateLimited => retriable_error(&e),
        _ => McpError::internal_error(e.to_string(), None),
    }
}

pub(super) fn pdf_to_mcp_error(e: PdfError) -> McpError {
    match &e {
        PdfError::NotFound(_) | PdfError::Parse { .. } => {
            McpError::invalid_params(e.to_string(), None)
        }
        PdfError::Copy { .. } => McpError::internal_error(e.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_model_hints_pull() {
        let err = store_to_mcp_error(StoreError::Embed(EmbedError::ModelNotFound("bge-m3".into())));
        assert!(err.message.contains("ollama pull bge-m3"), "got: {}", err.message);
    }

    #[test]
    fn store_server_error_is_retriable() {
        let err = store_to_mcp_error(StoreError::Api {
            code: 503,
            message: "busy".into(),
        });
        assert!(err.message.contains("retriable"));
    }

    #[test]
    fn store_client_error_is_not_retriable() {
        let err = store_to_mcp_error(StoreError::Api {
            code: 422,
            message: "bad embedding dimension".into(),
        });
        assert!(!err.message.contains("retriable"));
        assert!(err.message.contains("bad embedding dimension"));
    }

    #[test]
    fn missing_tavily_key_is_invalid_params() {
        let err = tavily_to_mcp_error(TavilyError::ApiKeyNotSet);
        assert_eq!(err.code, rmcp::model::ErrorCode(-32602));
        assert!(err.message.contains("TAVILY_API_KEY"));
    }

    #[test]
    fn tavily_rate_limit_is_retriable() {
        let err = tavily_to_mcp_error(TavilyError::RateLimited);
        assert!(err.message.contains("retriable"));
    }

    #[test]
    fn missing_pdf_is_invalid_params() {
        let err = pdf_to_mcp_error(PdfError::NotFound(PathBuf::from("data/x.pdf")));
        assert_eq!(err.code, rmcp::model::ErrorCode(-32602));
        assert!(err.message.contains("data/x.pdf"));
    }

    #[test]
    fn copy_failure_is_internal_error() {
        let err = pdf_to_mcp_error(PdfError::Copy {
            from: PathBuf::from("a.pdf"),
            to: PathBuf::from("data/a.pdf"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(err.code, rmcp::model::ErrorCode(-32603));
    }
}
