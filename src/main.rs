mod chroma;
mod document;
mod http;
mod ollama;
mod pdf;
mod retrieval;
mod tavily;
mod tools;

pub const USER_AGENT: &str = concat!("concierge/", env!("CARGO_PKG_VERSION"), " (MCP Server)");

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use retrieval::{Retrieval, Tool};
use rmcp::{ServiceExt, transport::stdio};
use tools::Concierge;
use tracing::info;

#[derive(Parser)]
#[command(name = "concierge", version, about = "Restaurant menu, wine and web retrieval tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the tools over MCP stdio (default)
    Serve {
        /// Directory for ASCII-named copies made by load_pdf
        #[arg(long, default_value = pdf::DEFAULT_COPY_DIR)]
        copy_dir: PathBuf,
    },
    /// Load a PDF, copying it to an ASCII file name first if its name contains Hangul
    LoadPdf {
        path: PathBuf,
        #[arg(long, default_value = pdf::DEFAULT_COPY_DIR)]
        copy_dir: PathBuf,
    },
    /// Run one retrieval tool and print the documents as JSON
    Search {
        #[arg(value_enum)]
        tool: Tool,
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("concierge=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve {
        copy_dir: PathBuf::from(pdf::DEFAULT_COPY_DIR),
    });

    match command {
        Command::Serve { copy_dir } => {
            info!("starting concierge MCP server");
            let retrieval = Retrieval::from_env(http::build_client()?);
            let service = Concierge::new(retrieval, copy_dir)
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("failed to start server: {e}"))?;

            service.waiting().await?;
            info!("server stopped");
        }
        Command::LoadPdf { path, copy_dir } => {
            let loaded = pdf::normalize_and_load(&path, &copy_dir)?;
            println!("{}", loaded.loader.path().display());
            println!("pages: {}", loaded.pages.len());
        }
        Command::Search { tool, query } => {
            let retrieval = Retrieval::from_env(http::build_client()?);
            let docs = retrieval.run(tool, &query).await?;
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["concierge"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn search_parses_tool_and_query() {
        let cli = Cli::try_parse_from(["concierge", "search", "wine", "샤르도네"]).unwrap();
        match cli.command {
            Some(Command::Search { tool, query }) => {
                assert_eq!(tool, Tool::Wine);
                assert_eq!(query, "샤르도네");
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn load_pdf_copy_dir_defaults_to_data() {
        let cli = Cli::try_parse_from(["concierge", "load-pdf", "data/근로기준법.pdf"]).unwrap();
        match cli.command {
            Some(Command::LoadPdf { path, copy_dir }) => {
                assert_eq!(path, PathBuf::from("data/근로기준법.pdf"));
                assert_eq!(copy_dir, PathBuf::from("data"));
            }
            _ => panic!("expected load-pdf command"),
        }
    }

    #[test]
    fn unknown_tool_is_rejected() {
        assert!(Cli::try_parse_from(["concierge", "search", "dessert", "q"]).is_err());
    }
}
