//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Each call walks an ordered list of endpoint variants (primary model on
//! `v1beta`, primary model on `v1`, fallback model on `v1beta`). Any non-2xx
//! status, network error, or empty candidate list moves on to the next
//! variant; the first success wins.

use std::sync::LazyLock;
use std::time::Duration;

use quill_core::sanitize::strip_code_fence;
use quill_core::{AppConfig, ArticleResult};
use regex::Regex;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::GeminiError;
use crate::parse::{normalize_article, parse_response};
use crate::prompt::{article_prompt, investigate_prompt, suggest_prompt};
use crate::types::{
    ArticleRequest, GenerateRequest, GenerateResponse, GenerationConfig, RequestContent,
    RequestPart, TopicIdea,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Error bodies are cut to this many characters before being stored.
const MAX_ERROR_BODY_CHARS: usize = 500;

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").expect("valid list marker regex"));

const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    top_k: 40,
    top_p: 0.95,
    max_output_tokens: 8192,
};

/// One `(api_version, model)` combination in the fallback list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub api_version: &'static str,
    pub model: String,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version, self.model)
    }
}

/// Client for the Gemini generative language API.
///
/// Use [`GeminiClient::from_app_config`] in the binaries or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests. A
/// client without an API key can be constructed; every call on it fails with
/// [`GeminiError::MissingApiKey`] before touching the network.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    primary_model: String,
    fallback_model: String,
}

impl GeminiClient {
    /// Creates a client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<String>,
        primary_model: &str,
        fallback_model: &str,
    ) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, primary_model, fallback_model)
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::InvalidBaseUrl`] if `QUILL_GEMINI_BASE_URL` is
    /// not a valid URL, or [`GeminiError::Http`] if the client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GeminiError> {
        Self::with_base_url(
            config.gemini_api_key.clone(),
            &config.gemini_base_url,
            &config.gemini_model,
            &config.gemini_fallback_model,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// No overall request timeout is set: a generation call may legitimately
    /// take minutes, and the invocation is bounded by its trigger.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeminiError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: &str,
        primary_model: &str,
        fallback_model: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("quill/0.1 (content-pipeline)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| GeminiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: parsed,
            primary_model: primary_model.to_string(),
            fallback_model: fallback_model.to_string(),
        })
    }

    /// Whether an API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The ordered endpoint fallback list.
    #[must_use]
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints = vec![
            Endpoint {
                api_version: "v1beta",
                model: self.primary_model.clone(),
            },
            Endpoint {
                api_version: "v1",
                model: self.primary_model.clone(),
            },
        ];
        if self.fallback_model != self.primary_model {
            endpoints.push(Endpoint {
                api_version: "v1beta",
                model: self.fallback_model.clone(),
            });
        }
        endpoints
    }

    /// Generate a full article and normalize it into an [`ArticleResult`].
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`] when no key is configured, or
    /// [`GeminiError::AllEndpointsFailed`] when every endpoint failed.
    /// Unparseable output is not an error: it yields a placeholder body.
    pub async fn generate_article(
        &self,
        request: &ArticleRequest<'_>,
    ) -> Result<ArticleResult, GeminiError> {
        let text = self.generate_text(&article_prompt(request)).await?;
        let parsed = parse_response(&text);
        tracing::debug!(topic = request.topic, rung = parsed.kind(), "gemini: article response parsed");
        Ok(normalize_article(parsed, request))
    }

    /// Expand a one-line idea into a titled, described, keyworded topic.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`], [`GeminiError::AllEndpointsFailed`],
    /// or [`GeminiError::MalformedResponse`] if no title can be recovered.
    pub async fn investigate_topic(&self, idea: &str) -> Result<TopicIdea, GeminiError> {
        let text = self.generate_text(&investigate_prompt(idea)).await?;
        parse_topic_idea(&text)
    }

    /// Ask for a list of fresh topic ideas.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`] or
    /// [`GeminiError::AllEndpointsFailed`].
    pub async fn suggest_topic_ideas(&self) -> Result<Vec<String>, GeminiError> {
        let text = self.generate_text(&suggest_prompt()).await?;
        Ok(parse_idea_list(&text))
    }

    /// Send a prompt through the endpoint fallback list and return the first
    /// non-empty candidate text.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`] when no key is configured, or
    /// [`GeminiError::AllEndpointsFailed`] wrapping the last attempt's error.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;

        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GENERATION_CONFIG,
        };

        let endpoints = self.endpoints();
        let attempts = endpoints.len();
        let mut last_error = None;

        for endpoint in &endpoints {
            match self.call_endpoint(api_key, endpoint, &body).await {
                Ok(text) => {
                    tracing::debug!(%endpoint, "gemini: endpoint succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!(%endpoint, error = %e, "gemini: endpoint failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(GeminiError::AllEndpointsFailed {
            attempts,
            last: Box::new(last_error.unwrap_or(GeminiError::EmptyResponse)),
        })
    }

    async fn call_endpoint(
        &self,
        api_key: &str,
        endpoint: &Endpoint,
        body: &GenerateRequest<'_>,
    ) -> Result<String, GeminiError> {
        let url = self.endpoint_url(endpoint, api_key);
        // The URL carries the API key; strip it from transport errors.
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GeminiError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Http(e.without_url()))?;
        payload.into_text().ok_or(GeminiError::EmptyResponse)
    }

    /// Builds `{base}/{version}/models/{model}:generateContent?key=...`.
    fn endpoint_url(&self, endpoint: &Endpoint, api_key: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}{}/models/{}:generateContent",
            url.path(),
            endpoint.api_version,
            endpoint.model
        );
        url.set_path(&path);
        url.query_pairs_mut().append_pair("key", api_key);
        url
    }
}

fn parse_topic_idea(text: &str) -> Result<TopicIdea, GeminiError> {
    let candidate = strip_code_fence(text).unwrap_or_else(|| text.trim());
    let object = match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Value>(&candidate[start..=end]).ok()
        }
        _ => None,
    }
    .ok_or_else(|| GeminiError::MalformedResponse("no JSON object in topic response".into()))?;

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GeminiError::MalformedResponse("topic response has no title".into()))?
        .to_string();

    let description = object
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let keywords = match object.get("keywords") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(TopicIdea {
        title,
        description,
        keywords,
    })
}

fn parse_idea_list(text: &str) -> Vec<String> {
    let candidate = strip_code_fence(text).unwrap_or_else(|| text.trim());

    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(candidate) {
        return items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    candidate
        .lines()
        .map(|line| {
            LIST_MARKER
                .replace(line, "")
                .trim()
                .trim_end_matches(',')
                .trim_matches('"')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty() && line != "[" && line != "]")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::with_base_url(
            Some("test-key".to_string()),
            base_url,
            "gemini-2.5-flash",
            "gemini-2.0-flash",
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_list_is_ordered() {
        let client = test_client("https://generativelanguage.googleapis.com");
        let labels: Vec<String> = client.endpoints().iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec![
                "v1beta/gemini-2.5-flash",
                "v1/gemini-2.5-flash",
                "v1beta/gemini-2.0-flash"
            ]
        );
    }

    #[test]
    fn identical_fallback_model_is_not_repeated() {
        let client = GeminiClient::with_base_url(
            Some("k".to_string()),
            "https://example.test",
            "gemini-2.5-flash",
            "gemini-2.5-flash",
        )
        .expect("client");
        assert_eq!(client.endpoints().len(), 2);
    }

    #[test]
    fn endpoint_url_includes_model_and_key() {
        let client = test_client("https://generativelanguage.googleapis.com/");
        let url = client.endpoint_url(&client.endpoints()[1], "test-key");
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-flash:generateContent?key=test-key"
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let client = GeminiClient::with_base_url(
            Some("   ".to_string()),
            "https://example.test",
            "a",
            "b",
        )
        .expect("client");
        assert!(!client.is_configured());
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let err = GeminiClient::with_base_url(None, "not a url", "a", "b")
            .err()
            .expect("should fail");
        assert!(err.is_configuration(), "got {err:?}");
    }

    #[test]
    fn topic_idea_parses_fenced_json() {
        let text = "```json\n{\"title\": \"Rainwater on shed roofs\", \"description\": \"Gutters.\", \"keywords\": [\"gutter\", \" \", \"water butt\"]}\n```";
        let idea = parse_topic_idea(text).expect("parse");
        assert_eq!(idea.title, "Rainwater on shed roofs");
        assert_eq!(idea.description, "Gutters.");
        assert_eq!(idea.keywords, vec!["gutter", "water butt"]);
    }

    #[test]
    fn topic_idea_accepts_comma_separated_keywords() {
        let idea = parse_topic_idea(r#"{"title": "T", "keywords": "a, b"}"#).expect("parse");
        assert_eq!(idea.keywords, vec!["a", "b"]);
    }

    #[test]
    fn topic_idea_without_title_is_malformed() {
        let err = parse_topic_idea(r#"{"description": "no title"}"#).unwrap_err();
        assert!(matches!(err, GeminiError::MalformedResponse(_)), "got {err:?}");
        let err = parse_topic_idea("not json at all").unwrap_err();
        assert!(matches!(err, GeminiError::MalformedResponse(_)), "got {err:?}");
    }

    #[test]
    fn idea_list_parses_json_array() {
        let ideas = parse_idea_list("```json\n[\"One idea\", \"Two idea\", \"\"]\n```");
        assert_eq!(ideas, vec!["One idea", "Two idea"]);
    }

    #[test]
    fn idea_list_falls_back_to_lines() {
        let ideas = parse_idea_list("1. First idea\n- Second idea\n\n* \"Third idea\"\n10 ways to insulate");
        assert_eq!(
            ideas,
            vec!["First idea", "Second idea", "Third idea", "10 ways to insulate"]
        );
    }
}
