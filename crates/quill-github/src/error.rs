use thiserror::Error;

/// Errors returned by the GitHub contents client.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Token or repository is missing from configuration.
    #[error("GitHub publishing is not configured: {0} is not set")]
    NotConfigured(&'static str),

    #[error("invalid GitHub configuration: {0}")]
    InvalidConfig(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The write lost a race with another commit to the same file.
    #[error("GitHub rejected the write as conflicting (HTTP {status}): {message}")]
    Conflict { status: u16, message: String },

    /// Any other non-2xx response.
    #[error("GitHub returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected GitHub response: {0}")]
    Decode(String),
}

impl GitHubError {
    /// Whether an operator must fix configuration before a retry can succeed.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured(_) | Self::InvalidConfig(_))
    }
}
