//! Topic management commands: seeding, idea suggestion and investigation.

use std::path::Path;

use quill_core::AppConfig;
use quill_gemini::GeminiClient;
use sqlx::PgPool;

/// Load, validate and upsert the topics seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// the upsert transaction fails.
pub(crate) async fn run_seed_topics(pool: &PgPool, path: &Path) -> anyhow::Result<()> {
    let file = quill_core::load_topics(path)?;
    let count = quill_db::seed_topics(pool, &file.topics).await?;
    println!("seeded {count} topic(s) from {}", path.display());
    Ok(())
}

/// Print one suggested idea per line.
///
/// # Errors
///
/// Returns an error if the generation backend is not configured or every
/// endpoint failed.
pub(crate) async fn run_suggest(config: &AppConfig) -> anyhow::Result<()> {
    let generator = GeminiClient::from_app_config(config)?;
    let ideas = generator.suggest_topic_ideas().await?;

    if ideas.is_empty() {
        println!("no ideas returned");
    }
    for idea in ideas {
        println!("{idea}");
    }
    Ok(())
}

/// Research an idea and store it as a ready topic.
///
/// # Errors
///
/// Returns an error if investigation fails. The topic row created for the
/// idea stays `preparing` in that case.
pub(crate) async fn run_investigate(
    pool: &PgPool,
    config: &AppConfig,
    idea: &str,
    priority: i32,
) -> anyhow::Result<()> {
    let idea = idea.trim();
    if idea.is_empty() {
        anyhow::bail!("idea must not be empty");
    }

    let generator = GeminiClient::from_app_config(config)?;
    let topic = quill_pipeline::investigate_idea(pool, &generator, idea, priority).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "id": topic.id,
            "title": topic.title,
            "description": topic.description,
            "keywords": topic.keywords,
            "status": topic.status,
        }))?
    );
    Ok(())
}
