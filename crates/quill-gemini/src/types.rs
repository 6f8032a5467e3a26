use quill_core::ReferenceImage;
use serde::{Deserialize, Serialize};

/// Everything the article prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct ArticleRequest<'a> {
    pub topic: &'a str,
    pub keywords: &'a [String],
    pub notes: Option<&'a str>,
    pub scope_description: Option<&'a str>,
    pub reference_images: &'a [ReferenceImage],
    /// Target body length in words.
    pub target_length: u32,
}

impl<'a> ArticleRequest<'a> {
    #[must_use]
    pub fn new(topic: &'a str) -> Self {
        Self {
            topic,
            keywords: &[],
            notes: None,
            scope_description: None,
            reference_images: &[],
            target_length: 1500,
        }
    }
}

/// A topic fleshed out from a one-line idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicIdea {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest<'a> {
    pub contents: [RequestContent<'a>; 1],
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestContent<'a> {
    pub parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any.
    pub(crate) fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}
