//! OpenAI LLM provider for WebVision.

mod api;
mod converter;
mod models;
mod parser;
mod provider;

pub use provider::{DEFAULT_API_URL, OpenAIProvider};
