use quill_db::DbError;
use quill_gemini::GeminiError;
use quill_github::GitHubError;
use thiserror::Error;

use crate::outcome::FailureKind;

/// Errors from committing one draft to the content store.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A required draft field is empty; the draft needs human correction.
    #[error("draft has an empty {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Store(#[from] GitHubError),
}

impl PublishError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingField(_) => FailureKind::Precondition,
            Self::Store(e) if e.is_configuration() => FailureKind::Configuration,
            Self::Store(_) => FailureKind::Transient,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("generation failed: {0}")]
    Generation(#[from] GeminiError),

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),

    /// A specific topic was requested but is not claimable.
    #[error("topic {0} is not ready")]
    TopicUnavailable(i64),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

impl PipelineError {
    /// Classify the error for the invocation report.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Generation(e) if e.is_configuration() => FailureKind::Configuration,
            Self::Publish(e) => e.kind(),
            Self::TopicUnavailable(_) => FailureKind::Precondition,
            Self::Http(_) => FailureKind::Configuration,
            Self::Db(_) | Self::Generation(_) => FailureKind::Transient,
        }
    }
}
