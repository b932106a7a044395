//! Query embeddings via a local Ollama server.

pub mod client;
mod types;

pub use client::{Embedder, EmbedError, OllamaEmbeddings};
