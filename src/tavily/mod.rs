//! Web search through the Tavily API.

pub mod client;
pub mod types;

pub use client::{TavilyClient, TavilyError, WebSearch};
pub use types::WebResult;
