//! Shared domain types, configuration, and pure text transforms for quill.

pub mod app_config;
pub mod article;
pub mod completeness;
pub mod config;
pub mod drafts;
pub mod sanitize;
pub mod slug;
pub mod topics;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, WriteMode};
pub use article::{ArticleResult, ReferenceImage};
pub use completeness::{score_draft, CompletenessInput, DraftCompleteness};
pub use config::{load_app_config, load_app_config_from_env};
pub use drafts::{DraftExtension, DraftStatus};
pub use sanitize::{sanitize, strip_code_fence};
pub use slug::slugify;
pub use topics::{load_topics, parse_topics, TopicSeed, TopicStatus, TopicsFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read topics file {path}: {source}")]
    TopicsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse topics file: {0}")]
    TopicsFileParse(#[source] serde_yaml::Error),

    #[error("topics file validation failed: {0}")]
    Validation(String),
}
