//! Database operations for `topics`, including the exclusive claim used by
//! the write flow.
//!
//! Every lifecycle transition is a conditional `UPDATE ... WHERE status = ...`
//! so concurrent workers can never move a topic out of a state they do not
//! hold.

use chrono::{DateTime, Utc};
use quill_core::ReferenceImage;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `topics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicRow {
    pub id: i64,
    pub public_id: Uuid,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub research_notes: Option<String>,
    pub reference_images: Json<Vec<ReferenceImage>>,
    pub status: String,
    pub priority: i32,
    /// Human-readable phase marker, e.g. `"generating content"`.
    pub progress_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new topic.
#[derive(Debug, Clone, Default)]
pub struct NewTopic {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub research_notes: Option<String>,
    pub reference_images: Vec<ReferenceImage>,
    pub priority: i32,
}

// ---------------------------------------------------------------------------
// Claim coordination
// ---------------------------------------------------------------------------

/// Atomically claim the highest-priority `ready` topic.
///
/// Selection order is `priority DESC, created_at ASC, id ASC`. The candidate
/// row is locked with `FOR UPDATE SKIP LOCKED`, so concurrent callers each
/// get a distinct topic or `None`, never the same one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn claim_next_topic(
    pool: &PgPool,
    progress_status: &str,
) -> Result<Option<TopicRow>, DbError> {
    let row = sqlx::query_as::<_, TopicRow>(
        "UPDATE topics \
         SET status = 'in_progress', progress_status = $1, updated_at = NOW() \
         WHERE status = 'ready' AND id = ( \
             SELECT id FROM topics \
             WHERE status = 'ready' \
             ORDER BY priority DESC, created_at ASC, id ASC \
             LIMIT 1 \
             FOR UPDATE SKIP LOCKED \
         ) \
         RETURNING id, public_id, title, description, keywords, research_notes, \
                   reference_images, status, priority, progress_status, created_at, updated_at",
    )
    .bind(progress_status)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Claim one specific topic if, and only if, it is currently `ready`.
///
/// Returns `None` when the topic does not exist or another worker already
/// holds it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn claim_topic_by_id(
    pool: &PgPool,
    id: i64,
    progress_status: &str,
) -> Result<Option<TopicRow>, DbError> {
    let row = sqlx::query_as::<_, TopicRow>(
        "UPDATE topics \
         SET status = 'in_progress', progress_status = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'ready' \
         RETURNING id, public_id, title, description, keywords, research_notes, \
                   reference_images, status, priority, progress_status, created_at, updated_at",
    )
    .bind(progress_status)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Update the progress marker of a topic this worker holds.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is not
/// `in_progress`, or [`DbError::Sqlx`] if the update fails.
pub async fn set_topic_progress(
    pool: &PgPool,
    id: i64,
    progress_status: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE topics SET progress_status = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'in_progress'",
    )
    .bind(progress_status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTopicTransition {
            id,
            expected_status: "in_progress",
        });
    }

    Ok(())
}

/// Return a claimed topic to `ready` so a later invocation can retry it.
///
/// The marker records why the attempt was abandoned.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is not
/// `in_progress`, or [`DbError::Sqlx`] if the update fails.
pub async fn release_topic(pool: &PgPool, id: i64, progress_status: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE topics \
         SET status = 'ready', progress_status = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'in_progress'",
    )
    .bind(progress_status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTopicTransition {
            id,
            expected_status: "in_progress",
        });
    }

    Ok(())
}

/// Mark a claimed topic `completed` outside of draft materialization.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is not
/// `in_progress`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_topic(pool: &PgPool, id: i64, progress_status: &str) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    complete_topic_on(&mut conn, id, progress_status).await
}

pub(crate) async fn complete_topic_on(
    conn: &mut sqlx::PgConnection,
    id: i64,
    progress_status: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE topics \
         SET status = 'completed', progress_status = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'in_progress'",
    )
    .bind(progress_status)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTopicTransition {
            id,
            expected_status: "in_progress",
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Preparation
// ---------------------------------------------------------------------------

/// Insert a topic in `preparing` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a duplicate title).
pub async fn create_topic(
    pool: &PgPool,
    topic: &NewTopic,
    progress_status: Option<&str>,
) -> Result<TopicRow, DbError> {
    let row = sqlx::query_as::<_, TopicRow>(
        "INSERT INTO topics (public_id, title, description, keywords, research_notes, \
                             reference_images, status, priority, progress_status) \
         VALUES ($1, $2, $3, $4, $5, $6, 'preparing', $7, $8) \
         RETURNING id, public_id, title, description, keywords, research_notes, \
                   reference_images, status, priority, progress_status, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(&topic.title)
    .bind(&topic.description)
    .bind(&topic.keywords)
    .bind(&topic.research_notes)
    .bind(Json(&topic.reference_images))
    .bind(topic.priority)
    .bind(progress_status)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrite the descriptive fields of a topic still being prepared.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is not
/// `preparing`, or [`DbError::Sqlx`] if the update fails.
pub async fn update_topic_details(
    pool: &PgPool,
    id: i64,
    title: &str,
    description: &str,
    keywords: &[String],
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE topics \
         SET title = $1, description = $2, keywords = $3, updated_at = NOW() \
         WHERE id = $4 AND status = 'preparing'",
    )
    .bind(title)
    .bind(description)
    .bind(keywords)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTopicTransition {
            id,
            expected_status: "preparing",
        });
    }

    Ok(())
}

/// Record why preparation of a `preparing` topic stalled.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is not
/// `preparing`, or [`DbError::Sqlx`] if the update fails.
pub async fn note_topic_preparation(
    pool: &PgPool,
    id: i64,
    progress_status: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE topics SET progress_status = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'preparing'",
    )
    .bind(progress_status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTopicTransition {
            id,
            expected_status: "preparing",
        });
    }

    Ok(())
}

/// Move a topic from `preparing` to `ready`, making it claimable.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is not
/// `preparing`, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_topic_ready(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE topics \
         SET status = 'ready', progress_status = NULL, updated_at = NOW() \
         WHERE id = $1 AND status = 'preparing'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTopicTransition {
            id,
            expected_status: "preparing",
        });
    }

    Ok(())
}

/// Fetch a topic by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_topic(pool: &PgPool, id: i64) -> Result<TopicRow, DbError> {
    sqlx::query_as::<_, TopicRow>(
        "SELECT id, public_id, title, description, keywords, research_notes, \
                reference_images, status, priority, progress_status, created_at, updated_at \
         FROM topics \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
