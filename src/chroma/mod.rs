//! Similarity search against Chroma collections over its HTTP API.

pub mod client;
mod types;

pub use client::{ChromaClient, ChromaCollection, StoreError, VectorStore};
