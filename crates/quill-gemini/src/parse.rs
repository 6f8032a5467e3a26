//! Recovery of a structured article from free-form backend text.
//!
//! The backend is asked for a bare JSON object but may wrap it in a code
//! fence, surround it with prose, truncate it, or ignore the instruction
//! entirely. [`parse_response`] walks a fixed ladder and reports which rung
//! produced the result; [`normalize_article`] then fills every missing field
//! with its default.

use std::sync::LazyLock;

use quill_core::sanitize::{extract_string_field, strip_code_fence};
use quill_core::ArticleResult;
use regex::Regex;
use serde_json::Value;

use crate::types::ArticleRequest;

/// Body substituted whenever no usable content can be recovered.
pub const PLACEHOLDER_CONTENT: &str =
    "Content could not be extracted from the generation response. Please retry generation.";

const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_READ_TIME: &str = "5 min read";
const DEFAULT_LAYOUT: &str = "standard";

static MARKDOWN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s*#[ \t]+([^\n]+?)[ \t]*(?:\n|\z)").expect("valid title regex"));

/// Article fields as found in the response, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    pub meta_description: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    pub featured_image: Option<String>,
    pub image_caption: Option<String>,
    pub layout: Option<String>,
    pub show_article_summary: Option<bool>,
}

/// Which rung of the recovery ladder produced the article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// The text was a bare JSON object.
    WellFormed(RawArticle),
    /// The JSON object was wrapped in a Markdown code fence.
    RecoveredFromFence(RawArticle),
    /// The JSON object was embedded in surrounding text.
    RecoveredFromSubstring(RawArticle),
    /// No JSON could be parsed; the whole text is treated as the body.
    HeuristicFallback {
        title: Option<String>,
        content: String,
    },
    /// The text looked like JSON but could not be parsed, so it is withheld.
    PlaceholderDueToRawJson { title: Option<String> },
}

impl ParsedResponse {
    /// Short name of the rung, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WellFormed(_) => "well_formed",
            Self::RecoveredFromFence(_) => "recovered_from_fence",
            Self::RecoveredFromSubstring(_) => "recovered_from_substring",
            Self::HeuristicFallback { .. } => "heuristic_fallback",
            Self::PlaceholderDueToRawJson { .. } => "placeholder_due_to_raw_json",
        }
    }
}

/// Run the recovery ladder over raw backend text.
#[must_use]
pub fn parse_response(text: &str) -> ParsedResponse {
    let trimmed = text.trim();
    let (candidate, fenced) = match strip_code_fence(trimmed) {
        Some(inner) => (inner, true),
        None => (trimmed, false),
    };

    if let Some(article) = parse_object(candidate) {
        return if fenced {
            ParsedResponse::RecoveredFromFence(article)
        } else {
            ParsedResponse::WellFormed(article)
        };
    }

    if let (Some(start), Some(end)) = (candidate.find('{'), candidate.rfind('}')) {
        if start < end {
            if let Some(article) = parse_object(&candidate[start..=end]) {
                return ParsedResponse::RecoveredFromSubstring(article);
            }
        }
    }

    let title = heuristic_title(candidate);
    if candidate.starts_with('{') {
        ParsedResponse::PlaceholderDueToRawJson { title }
    } else {
        ParsedResponse::HeuristicFallback {
            title,
            content: candidate.to_string(),
        }
    }
}

/// Fill defaults and guard the body so every field of the result is usable.
#[must_use]
pub fn normalize_article(parsed: ParsedResponse, request: &ArticleRequest<'_>) -> ArticleResult {
    let raw = match parsed {
        ParsedResponse::WellFormed(raw)
        | ParsedResponse::RecoveredFromFence(raw)
        | ParsedResponse::RecoveredFromSubstring(raw) => raw,
        ParsedResponse::HeuristicFallback { title, content } => RawArticle {
            title,
            content: Some(content),
            ..RawArticle::default()
        },
        ParsedResponse::PlaceholderDueToRawJson { title } => RawArticle {
            title,
            ..RawArticle::default()
        },
    };

    let first_image = request.reference_images.first();

    let content = raw
        .content
        .filter(|c| {
            let c = c.trim();
            !c.is_empty() && !c.starts_with('{')
        })
        .unwrap_or_else(|| PLACEHOLDER_CONTENT.to_string());

    ArticleResult {
        title: non_blank(raw.title).unwrap_or_else(|| request.topic.trim().to_string()),
        content,
        meta_description: non_blank(raw.meta_description)
            .unwrap_or_else(|| default_meta_description(request.topic)),
        category: non_blank(raw.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        read_time: non_blank(raw.read_time).unwrap_or_else(|| DEFAULT_READ_TIME.to_string()),
        featured_image: non_blank(raw.featured_image)
            .or_else(|| first_image.map(|i| i.url.clone()))
            .unwrap_or_default(),
        image_caption: non_blank(raw.image_caption)
            .or_else(|| first_image.map(|i| i.description.clone()))
            .unwrap_or_default(),
        layout: non_blank(raw.layout).unwrap_or_else(|| DEFAULT_LAYOUT.to_string()),
        show_article_summary: raw.show_article_summary.unwrap_or(true),
    }
}

fn default_meta_description(topic: &str) -> String {
    format!("A practical guide to {}.", topic.trim())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_object(text: &str) -> Option<RawArticle> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;

    let string = |key: &str| match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };

    Some(RawArticle {
        title: string("title"),
        content: string("content"),
        meta_description: string("metaDescription"),
        category: string("category"),
        read_time: match object.get("readTime") {
            Some(Value::Number(n)) => Some(format!("{n} min read")),
            _ => string("readTime"),
        },
        featured_image: string("featuredImage"),
        image_caption: string("imageCaption"),
        layout: string("layout"),
        show_article_summary: match object.get("showArticleSummary") {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        },
    })
}

fn heuristic_title(text: &str) -> Option<String> {
    extract_string_field(text, "title")
        .or_else(|| MARKDOWN_TITLE.captures(text).map(|c| c[1].to_string()))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
