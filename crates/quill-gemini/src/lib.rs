//! Client for the Gemini `generateContent` API.
//!
//! Turns topic context into a prompt, walks an ordered list of model/API
//! version endpoints until one answers, and recovers a usable
//! [`ArticleResult`](quill_core::ArticleResult) from whatever text comes back.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use parse::{normalize_article, parse_response, ParsedResponse, RawArticle, PLACEHOLDER_CONTENT};
pub use types::{ArticleRequest, TopicIdea};
