//! Database operations for `drafts`.

use chrono::{DateTime, TimeDelta, Utc};
use quill_core::DraftStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::topics::complete_topic_on;
use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `drafts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DraftRow {
    pub id: i64,
    pub public_id: Uuid,
    pub topic_id: Option<i64>,
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub content: String,
    pub category: String,
    pub featured_image: String,
    pub read_time: String,
    /// Opaque presentation hints (`imageCaption`, `layout`, `showArticleSummary`).
    pub extension: serde_json::Value,
    pub status: String,
    pub scheduled_publish_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub commit_url: Option<String>,
    pub commit_sha: Option<String>,
    pub last_error: Option<String>,
    pub completeness: Option<serde_json::Value>,
    /// Set while a publisher holds the draft; see [`claim_due_draft`].
    pub publish_claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content fields written by the materializer.
#[derive(Debug, Clone)]
pub struct NewDraft {
    pub topic_id: Option<i64>,
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub content: String,
    pub category: String,
    pub featured_image: String,
    pub read_time: String,
    pub extension: serde_json::Value,
    pub status: DraftStatus,
    pub scheduled_publish_at: Option<DateTime<Utc>>,
    pub completeness: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

/// Insert a draft, or overwrite the content fields of the draft with the same
/// slug.
///
/// Publication history (`published_at`, `commit_url`, `commit_sha`) survives
/// the overwrite; `last_error` is cleared.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_draft(pool: &PgPool, draft: &NewDraft) -> Result<DraftRow, DbError> {
    let mut conn = pool.acquire().await?;
    upsert_draft_on(&mut conn, draft).await
}

/// Upsert a draft and mark its originating topic `completed` in one
/// transaction.
///
/// If the topic is no longer `in_progress` the whole operation is rolled back
/// and no draft is written.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is not
/// `in_progress`, or [`DbError::Sqlx`] if any statement fails.
pub async fn upsert_draft_and_complete_topic(
    pool: &PgPool,
    draft: &NewDraft,
    topic_id: i64,
    progress_status: &str,
) -> Result<DraftRow, DbError> {
    let mut tx = pool.begin().await?;
    let row = upsert_draft_on(&mut tx, draft).await?;
    complete_topic_on(&mut tx, topic_id, progress_status).await?;
    tx.commit().await?;
    Ok(row)
}

async fn upsert_draft_on(
    conn: &mut sqlx::PgConnection,
    draft: &NewDraft,
) -> Result<DraftRow, DbError> {
    let row = sqlx::query_as::<_, DraftRow>(
        "INSERT INTO drafts (public_id, topic_id, slug, title, meta_description, content, \
                             category, featured_image, read_time, extension, status, \
                             scheduled_publish_at, completeness) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (slug) DO UPDATE SET \
             topic_id = COALESCE(EXCLUDED.topic_id, drafts.topic_id), \
             title = EXCLUDED.title, \
             meta_description = EXCLUDED.meta_description, \
             content = EXCLUDED.content, \
             category = EXCLUDED.category, \
             featured_image = EXCLUDED.featured_image, \
             read_time = EXCLUDED.read_time, \
             extension = EXCLUDED.extension, \
             status = EXCLUDED.status, \
             scheduled_publish_at = EXCLUDED.scheduled_publish_at, \
             completeness = EXCLUDED.completeness, \
             last_error = NULL, \
             updated_at = NOW() \
         RETURNING id, public_id, topic_id, slug, title, meta_description, content, category, \
                   featured_image, read_time, extension, status, scheduled_publish_at, \
                   published_at, commit_url, commit_sha, last_error, completeness, publish_claimed_at, \
                   created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(draft.topic_id)
    .bind(&draft.slug)
    .bind(&draft.title)
    .bind(&draft.meta_description)
    .bind(&draft.content)
    .bind(&draft.category)
    .bind(&draft.featured_image)
    .bind(&draft.read_time)
    .bind(&draft.extension)
    .bind(draft.status.as_str())
    .bind(draft.scheduled_publish_at)
    .bind(&draft.completeness)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

/// How long a publish claim is honoured before another publisher may take
/// the draft over.
pub const PUBLISH_CLAIM_TTL_MINUTES: i64 = 10;

/// Atomically claim the earliest `scheduled` draft whose publish time is at
/// or before `now`.
///
/// The candidate row is locked with `FOR UPDATE SKIP LOCKED` and stamped with
/// `publish_claimed_at = now`, so concurrent publishers never receive the same
/// draft. A claim older than [`PUBLISH_CLAIM_TTL_MINUTES`] is treated as
/// abandoned and can be taken again.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn claim_due_draft(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<Option<DraftRow>, DbError> {
    let stale_before = now - TimeDelta::minutes(PUBLISH_CLAIM_TTL_MINUTES);

    let row = sqlx::query_as::<_, DraftRow>(
        "UPDATE drafts \
         SET publish_claimed_at = $1, updated_at = NOW() \
         WHERE id = ( \
             SELECT id FROM drafts \
             WHERE status = 'scheduled' AND scheduled_publish_at <= $1 \
               AND (publish_claimed_at IS NULL OR publish_claimed_at < $2) \
             ORDER BY scheduled_publish_at ASC, id ASC \
             LIMIT 1 \
             FOR UPDATE SKIP LOCKED \
         ) \
         RETURNING id, public_id, topic_id, slug, title, meta_description, content, category, \
                   featured_image, read_time, extension, status, scheduled_publish_at, \
                   published_at, commit_url, commit_sha, last_error, completeness, publish_claimed_at, \
                   created_at, updated_at",
    )
    .bind(now)
    .bind(stale_before)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Record a successful commit: status `published`, timestamp, and commit
/// reference. Releases the publish claim.
///
/// # Errors
///
/// Returns [`DbError::InvalidDraftTransition`] if the draft is not
/// `scheduled`, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_draft_published(
    pool: &PgPool,
    id: i64,
    published_at: DateTime<Utc>,
    commit_url: &str,
    commit_sha: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE drafts \
         SET status = 'published', published_at = $1, commit_url = $2, commit_sha = $3, \
             last_error = NULL, publish_claimed_at = NULL, updated_at = NOW() \
         WHERE id = $4 AND status = 'scheduled'",
    )
    .bind(published_at)
    .bind(commit_url)
    .bind(commit_sha)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidDraftTransition {
            id,
            expected_status: "scheduled",
        });
    }

    Ok(())
}

/// Park a draft that can never be published as-is in `failed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidDraftTransition`] if the draft is not
/// `scheduled`, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_draft_failed(pool: &PgPool, id: i64, reason: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE drafts \
         SET status = 'failed', last_error = $1, publish_claimed_at = NULL, updated_at = NOW() \
         WHERE id = $2 AND status = 'scheduled'",
    )
    .bind(reason)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidDraftTransition {
            id,
            expected_status: "scheduled",
        });
    }

    Ok(())
}

/// Store the reason for a transient publish failure and release the publish
/// claim so the next tick retries. Status stays `scheduled`.
///
/// # Errors
///
/// Returns [`DbError::InvalidDraftTransition`] if the draft is not
/// `scheduled`, or [`DbError::Sqlx`] if the update fails.
pub async fn record_draft_error(pool: &PgPool, id: i64, reason: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE drafts \
         SET last_error = $1, publish_claimed_at = NULL, updated_at = NOW() \
         WHERE id = $2 AND status = 'scheduled'",
    )
    .bind(reason)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidDraftTransition {
            id,
            expected_status: "scheduled",
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Fetch a draft by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_draft(pool: &PgPool, id: i64) -> Result<DraftRow, DbError> {
    sqlx::query_as::<_, DraftRow>(
        "SELECT id, public_id, topic_id, slug, title, meta_description, content, category, \
                featured_image, read_time, extension, status, scheduled_publish_at, \
                published_at, commit_url, commit_sha, last_error, completeness, publish_claimed_at, \
                created_at, updated_at \
         FROM drafts \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Fetch a draft by its slug.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no draft has the slug, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_draft_by_slug(pool: &PgPool, slug: &str) -> Result<DraftRow, DbError> {
    sqlx::query_as::<_, DraftRow>(
        "SELECT id, public_id, topic_id, slug, title, meta_description, content, category, \
                featured_image, read_time, extension, status, scheduled_publish_at, \
                published_at, commit_url, commit_sha, last_error, completeness, publish_claimed_at, \
                created_at, updated_at \
         FROM drafts \
         WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
