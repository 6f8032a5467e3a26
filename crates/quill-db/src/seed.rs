use quill_core::TopicSeed;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Upsert topics from a seed file, keyed by title.
///
/// New topics are inserted as `ready`. Existing topics get their descriptive
/// fields and priority refreshed; their status and progress marker are left
/// alone so re-seeding never resurrects a completed topic or steals a claimed
/// one. All upserts run inside a single transaction.
///
/// Returns the number of topics processed (inserted or updated).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_topics(pool: &PgPool, topics: &[TopicSeed]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for topic in topics {
        sqlx::query(
            "INSERT INTO topics (public_id, title, description, keywords, research_notes, \
                                 reference_images, status, priority) \
             VALUES ($1, $2, $3, $4, $5, $6, 'ready', $7) \
             ON CONFLICT (title) DO UPDATE SET \
                 description = EXCLUDED.description, \
                 keywords = EXCLUDED.keywords, \
                 research_notes = EXCLUDED.research_notes, \
                 reference_images = EXCLUDED.reference_images, \
                 priority = EXCLUDED.priority, \
                 updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(topic.title.trim())
        .bind(&topic.description)
        .bind(&topic.keywords)
        .bind(&topic.research_notes)
        .bind(Json(&topic.reference_images))
        .bind(topic.priority)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
