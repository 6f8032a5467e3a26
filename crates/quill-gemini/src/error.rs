use thiserror::Error;

/// Errors returned by the Gemini client.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key was configured. Never retried.
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("Gemini returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered 2xx but without any candidate text.
    #[error("Gemini response contained no candidate text")]
    EmptyResponse,

    /// Every endpoint in the fallback list failed.
    #[error("all {attempts} Gemini endpoints failed; last error: {last}")]
    AllEndpointsFailed {
        attempts: usize,
        #[source]
        last: Box<GeminiError>,
    },

    /// The response text could not be turned into the requested shape.
    #[error("malformed Gemini response: {0}")]
    MalformedResponse(String),

    #[error("invalid Gemini base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GeminiError {
    /// Whether this error needs an operator to fix configuration rather than
    /// a later retry.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::InvalidBaseUrl { .. })
    }
}
