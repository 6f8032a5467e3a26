//! Offline unit tests for quill-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use quill_core::{AppConfig, Environment, WriteMode};
use quill_db::{DbError, PoolConfig, TopicRow};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        gemini_api_key: None,
        gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
        gemini_model: "gemini-2.5-flash".to_string(),
        gemini_fallback_model: "gemini-2.0-flash".to_string(),
        target_length: 1500,
        github_token: None,
        github_repo: None,
        github_branch: None,
        github_api_url: "https://api.github.com".to_string(),
        content_dir: "content/blog".to_string(),
        content_extension: "mdx".to_string(),
        notify_webhook_url: None,
        cron_secret: None,
        scheduler_enabled: false,
        write_cron: "0 */15 * * * *".to_string(),
        publish_cron: "0 */5 * * * *".to_string(),
        write_mode: WriteMode::Review,
        topics_path: PathBuf::from("./config/topics.yaml"),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`TopicRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn topic_row_has_expected_fields() {
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    let row = TopicRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        title: "Deck care".to_string(),
        description: String::new(),
        keywords: vec!["deck".to_string()],
        research_notes: None,
        reference_images: Json(vec![]),
        status: "ready".to_string(),
        priority: 0_i32,
        progress_status: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.status, "ready");
    assert!(row.reference_images.0.is_empty());
}

#[test]
fn transition_errors_name_the_expected_status() {
    let err = DbError::InvalidTopicTransition {
        id: 7,
        expected_status: "in_progress",
    };
    assert_eq!(err.to_string(), "topic 7 is not in 'in_progress' status");

    let err = DbError::InvalidDraftTransition {
        id: 3,
        expected_status: "scheduled",
    };
    assert_eq!(err.to_string(), "draft 3 is not in 'scheduled' status");
}
