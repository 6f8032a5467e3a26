use crate::app_config::{AppConfig, Environment, WriteMode};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates with blank keys behave.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("QUILL_ENV", "development"))?;

    let bind_addr = parse_addr("QUILL_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("QUILL_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("QUILL_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("QUILL_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("QUILL_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_base_url = or_default(
        "QUILL_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let gemini_model = or_default("QUILL_GEMINI_MODEL", "gemini-2.5-flash");
    let gemini_fallback_model = or_default("QUILL_GEMINI_FALLBACK_MODEL", "gemini-2.0-flash");
    let target_length = parse_u32("QUILL_TARGET_LENGTH", "1500")?;
    if target_length == 0 {
        return Err(invalid("QUILL_TARGET_LENGTH", "must be positive".to_string()));
    }

    let github_token = optional("GITHUB_TOKEN");
    let github_repo = optional("QUILL_GITHUB_REPO");
    if let Some(repo) = &github_repo {
        validate_repo(repo).map_err(|reason| invalid("QUILL_GITHUB_REPO", reason))?;
    }
    let github_branch = optional("QUILL_GITHUB_BRANCH");
    let github_api_url = or_default("QUILL_GITHUB_API_URL", "https://api.github.com");
    let content_dir = or_default("QUILL_CONTENT_DIR", "content/blog")
        .trim_matches('/')
        .to_string();
    let content_extension = or_default("QUILL_CONTENT_EXTENSION", "mdx")
        .trim_start_matches('.')
        .to_string();

    let notify_webhook_url = optional("QUILL_NOTIFY_WEBHOOK_URL");
    let cron_secret = optional("QUILL_CRON_SECRET");

    let scheduler_enabled = parse_bool("QUILL_SCHEDULER_ENABLED", "true")?;
    let write_cron = or_default("QUILL_WRITE_CRON", "0 */15 * * * *");
    let publish_cron = or_default("QUILL_PUBLISH_CRON", "0 */5 * * * *");

    let delay_hours = parse_u32("QUILL_SCHEDULE_DELAY_HOURS", "24")?;
    let write_mode = parse_write_mode(&or_default("QUILL_WRITE_MODE", "review"), delay_hours)?;

    let topics_path = PathBuf::from(or_default("QUILL_TOPICS_PATH", "./config/topics.yaml"));

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        gemini_api_key,
        gemini_base_url,
        gemini_model,
        gemini_fallback_model,
        target_length,
        github_token,
        github_repo,
        github_branch,
        github_api_url,
        content_dir,
        content_extension,
        notify_webhook_url,
        cron_secret,
        scheduler_enabled,
        write_cron,
        publish_cron,
        write_mode,
        topics_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "QUILL_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

fn parse_write_mode(s: &str, delay_hours: u32) -> Result<WriteMode, ConfigError> {
    match s {
        "review" => Ok(WriteMode::Review),
        "schedule" => Ok(WriteMode::Schedule { delay_hours }),
        "immediate" => Ok(WriteMode::Immediate),
        other => Err(ConfigError::InvalidEnvVar {
            var: "QUILL_WRITE_MODE".to_string(),
            reason: format!("expected review, schedule, or immediate, got '{other}'"),
        }),
    }
}

fn validate_repo(repo: &str) -> Result<(), String> {
    let mut parts = repo.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(()),
        _ => Err(format!("expected 'owner/name', got '{repo}'")),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
