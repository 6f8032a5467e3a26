use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What the write flow does with a freshly generated draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep the draft in `draft` status for a human to review.
    Review,
    /// Schedule the draft `delay_hours` after generation.
    Schedule { delay_hours: u32 },
    /// Schedule the draft for now; the next publish tick commits it.
    Immediate,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Review => write!(f, "review"),
            WriteMode::Schedule { delay_hours } => write!(f, "schedule(+{delay_hours}h)"),
            WriteMode::Immediate => write!(f, "immediate"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_fallback_model: String,
    pub target_length: u32,
    pub github_token: Option<String>,
    pub github_repo: Option<String>,
    pub github_branch: Option<String>,
    pub github_api_url: String,
    pub content_dir: String,
    pub content_extension: String,
    pub notify_webhook_url: Option<String>,
    pub cron_secret: Option<String>,
    pub scheduler_enabled: bool,
    pub write_cron: String,
    pub publish_cron: String,
    pub write_mode: WriteMode,
    pub topics_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_fallback_model", &self.gemini_fallback_model)
            .field("target_length", &self.target_length)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[redacted]"),
            )
            .field("github_repo", &self.github_repo)
            .field("github_branch", &self.github_branch)
            .field("github_api_url", &self.github_api_url)
            .field("content_dir", &self.content_dir)
            .field("content_extension", &self.content_extension)
            .field(
                "notify_webhook_url",
                &self.notify_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "cron_secret",
                &self.cron_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("scheduler_enabled", &self.scheduler_enabled)
            .field("write_cron", &self.write_cron)
            .field("publish_cron", &self.publish_cron)
            .field("write_mode", &self.write_mode)
            .field("topics_path", &self.topics_path)
            .finish()
    }
}
