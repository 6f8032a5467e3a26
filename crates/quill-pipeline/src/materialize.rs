//! Turning a generated article into a persisted draft.

use chrono::{DateTime, Duration, Utc};
use quill_core::{
    sanitize, score_draft, slugify, ArticleResult, CompletenessInput, DraftExtension,
    DraftStatus, WriteMode,
};
use quill_db::{DbError, DraftRow, NewDraft, TopicRow};
use sqlx::PgPool;

/// Marker left on a topic once its draft is saved.
pub const COMPLETED_MARKER: &str = "draft saved";

/// Slug for a generated article.
///
/// Falls back to the topic title, then to `topic-{id}`, so titles made only
/// of punctuation or non-Latin script still get a unique filename stem.
#[must_use]
pub fn draft_slug(topic: &TopicRow, article: &ArticleResult) -> String {
    [article.title.as_str(), topic.title.as_str()]
        .into_iter()
        .map(slugify)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| format!("topic-{}", topic.id))
}

/// Status and publish time a new draft gets under `mode`.
#[must_use]
pub fn initial_schedule(mode: WriteMode, now: DateTime<Utc>) -> (DraftStatus, Option<DateTime<Utc>>) {
    match mode {
        WriteMode::Review => (DraftStatus::Draft, None),
        WriteMode::Schedule { delay_hours } => (
            DraftStatus::Scheduled,
            Some(now + Duration::hours(i64::from(delay_hours))),
        ),
        WriteMode::Immediate => (DraftStatus::Scheduled, Some(now)),
    }
}

/// Build the row to upsert for `article`, generated from `topic`.
///
/// The body is sanitized here; nothing unsanitized reaches the datastore.
#[must_use]
pub fn build_draft(
    topic: &TopicRow,
    article: &ArticleResult,
    mode: WriteMode,
    target_words: u32,
    now: DateTime<Utc>,
) -> NewDraft {
    let slug = draft_slug(topic, article);
    let content = sanitize(&article.content);
    let (status, scheduled_publish_at) = initial_schedule(mode, now);

    let completeness = score_draft(&CompletenessInput {
        title: &article.title,
        meta_description: &article.meta_description,
        content: &content,
        featured_image: &article.featured_image,
        category: &article.category,
        slug: &slug,
        target_words,
    });

    let extension = DraftExtension {
        image_caption: Some(article.image_caption.clone()).filter(|c| !c.is_empty()),
        layout: Some(article.layout.clone()),
        show_article_summary: Some(article.show_article_summary),
    };

    NewDraft {
        topic_id: Some(topic.id),
        slug,
        title: article.title.clone(),
        meta_description: article.meta_description.clone(),
        content,
        category: article.category.clone(),
        featured_image: article.featured_image.clone(),
        read_time: article.read_time.clone(),
        extension: serde_json::to_value(extension).unwrap_or_else(|_| serde_json::json!({})),
        status,
        scheduled_publish_at,
        completeness: serde_json::to_value(completeness).unwrap_or(serde_json::Value::Null),
    }
}

/// Persist the draft and complete the topic in one transaction.
///
/// An existing draft with the same slug is updated in place.
///
/// # Errors
///
/// Returns [`DbError::InvalidTopicTransition`] if the topic is no longer
/// `in_progress` (nothing is written), or [`DbError::Sqlx`].
pub async fn materialize(
    pool: &PgPool,
    topic: &TopicRow,
    article: &ArticleResult,
    mode: WriteMode,
    target_words: u32,
    now: DateTime<Utc>,
) -> Result<DraftRow, DbError> {
    let draft = build_draft(topic, article, mode, target_words, now);
    let row = quill_db::upsert_draft_and_complete_topic(pool, &draft, topic.id, COMPLETED_MARKER)
        .await?;
    tracing::info!(
        topic_id = topic.id,
        draft_id = row.id,
        slug = %row.slug,
        status = %row.status,
        "pipeline: draft materialized"
    );
    Ok(row)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use quill_core::DraftCompleteness;
    use sqlx::types::{Json, Uuid};

    use super::*;

    fn topic(title: &str) -> TopicRow {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        TopicRow {
            id: 42,
            public_id: Uuid::nil(),
            title: title.to_string(),
            description: String::new(),
            keywords: Vec::new(),
            research_notes: None,
            reference_images: Json(Vec::new()),
            status: "in_progress".to_string(),
            priority: 0,
            progress_status: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn article(title: &str, content: &str) -> ArticleResult {
        ArticleResult {
            title: title.to_string(),
            content: content.to_string(),
            meta_description: "A practical guide to keeping a timber deck in shape for decades."
                .to_string(),
            category: "Maintenance".to_string(),
            read_time: "4 min read".to_string(),
            featured_image: "https://img.example/deck.jpg".to_string(),
            image_caption: String::new(),
            layout: "standard".to_string(),
            show_article_summary: true,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn slug_prefers_article_title() {
        let slug = draft_slug(&topic("Deck care"), &article("Steel vs. Wood: What's Best?", "x"));
        assert_eq!(slug, "steel-vs-wood-what-s-best");
    }

    #[test]
    fn slug_falls_back_to_topic_then_id() {
        assert_eq!(draft_slug(&topic("Deck care"), &article("???", "x")), "deck-care");
        assert_eq!(draft_slug(&topic("…"), &article("—", "x")), "topic-42");
    }

    #[test]
    fn write_modes_set_status_and_time() {
        assert_eq!(initial_schedule(WriteMode::Review, now()), (DraftStatus::Draft, None));
        assert_eq!(
            initial_schedule(WriteMode::Immediate, now()),
            (DraftStatus::Scheduled, Some(now()))
        );
        assert_eq!(
            initial_schedule(WriteMode::Schedule { delay_hours: 24 }, now()),
            (
                DraftStatus::Scheduled,
                Some(Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap())
            )
        );
    }

    #[test]
    fn build_draft_sanitizes_and_links_topic() {
        let raw = "```json\n{\"content\": \"# Deck Care\\n\\n## Oil\\n\\nTwice a year.\"}\n```";
        let draft = build_draft(
            &topic("Deck care"),
            &article("Deck Care", raw),
            WriteMode::Review,
            800,
            now(),
        );

        assert_eq!(draft.topic_id, Some(42));
        assert_eq!(draft.slug, "deck-care");
        assert_eq!(draft.content, "## Oil\n\nTwice a year.");
        assert_eq!(draft.status, DraftStatus::Draft);
        assert!(draft.scheduled_publish_at.is_none());

        let score: DraftCompleteness =
            serde_json::from_value(draft.completeness).expect("completeness is a score");
        assert_eq!(score.section_count, 1);
        assert!(score.has_slug);
    }

    #[test]
    fn build_draft_records_presentation_hints() {
        let mut art = article("Deck Care", "Body");
        art.image_caption = "Freshly oiled boards".to_string();
        art.layout = "wide".to_string();
        art.show_article_summary = false;

        let draft = build_draft(&topic("Deck care"), &art, WriteMode::Review, 800, now());
        let ext = DraftExtension::from_value(&draft.extension);
        assert_eq!(ext.image_caption.as_deref(), Some("Freshly oiled boards"));
        assert_eq!(ext.layout.as_deref(), Some("wide"));
        assert_eq!(ext.show_article_summary, Some(false));
    }
}
