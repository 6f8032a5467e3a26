//! Turning a one-line idea into a claimable topic.

use quill_db::{NewTopic, TopicRow};
use quill_gemini::{GeminiClient, GeminiError};
use sqlx::PgPool;

use crate::error::PipelineError;

const INVESTIGATING_MARKER: &str = "investigating idea";

/// Insert `idea` as a `preparing` topic, expand it with the generation
/// backend, and make it `ready`.
///
/// When expansion fails (backend error, or the expanded title is already
/// taken) the topic stays `preparing` with a marker saying why, so the idea is
/// not lost.
///
/// # Errors
///
/// Returns [`PipelineError::Generation`] (including a missing API key,
/// checked before anything is inserted) or [`PipelineError::Db`].
pub async fn investigate_idea(
    pool: &PgPool,
    generator: &GeminiClient,
    idea: &str,
    priority: i32,
) -> Result<TopicRow, PipelineError> {
    if !generator.is_configured() {
        return Err(GeminiError::MissingApiKey.into());
    }

    let topic = quill_db::create_topic(
        pool,
        &NewTopic {
            title: idea.trim().to_string(),
            priority,
            ..NewTopic::default()
        },
        Some(INVESTIGATING_MARKER),
    )
    .await?;

    match expand_topic(pool, generator, topic.id, idea).await {
        Ok(topic) => Ok(topic),
        Err(e) => {
            let marker = format!("investigation failed: {e}");
            if let Err(note) = quill_db::note_topic_preparation(pool, topic.id, &marker).await {
                tracing::error!(topic_id = topic.id, error = %note, "pipeline: failed to record investigation failure");
            }
            Err(e)
        }
    }
}

async fn expand_topic(
    pool: &PgPool,
    generator: &GeminiClient,
    topic_id: i64,
    idea: &str,
) -> Result<TopicRow, PipelineError> {
    let expanded = generator.investigate_topic(idea).await?;

    quill_db::update_topic_details(
        pool,
        topic_id,
        &expanded.title,
        &expanded.description,
        &expanded.keywords,
    )
    .await?;
    quill_db::mark_topic_ready(pool, topic_id).await?;
    tracing::info!(topic_id, title = %expanded.title, "pipeline: idea investigated");

    Ok(quill_db::get_topic(pool, topic_id).await?)
}
