//! Scheduler flows: write (topic to draft) and publish (due draft to commit).
//!
//! Every flow processes at most one unit and never returns an error: failures
//! are folded into [`FlowOutcome::Failed`] after the claimed state has been
//! reverted or parked.

use chrono::Utc;
use quill_core::{AppConfig, WriteMode};
use quill_db::{DraftRow, TopicRow};
use quill_gemini::{ArticleRequest, GeminiClient};
use sqlx::PgPool;

use crate::error::{PipelineError, PublishError};
use crate::materialize::materialize;
use crate::notify::{Notifier, PublishedNotice};
use crate::outcome::{FailureKind, FlowOutcome, InvocationReport};
use crate::publish::Publisher;

const CLAIMED_MARKER: &str = "claimed for generation";
const GENERATING_MARKER: &str = "generating article";
const SAVING_MARKER: &str = "saving draft";

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub write_mode: WriteMode,
    /// Target body length in words.
    pub target_length: u32,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            write_mode: config.write_mode,
            target_length: config.target_length,
        }
    }
}

/// The publication pipeline with its collaborators injected.
pub struct Pipeline {
    pool: PgPool,
    generator: GeminiClient,
    publisher: Publisher,
    notifier: Notifier,
    settings: PipelineSettings,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        pool: PgPool,
        generator: GeminiClient,
        publisher: Publisher,
        notifier: Notifier,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            pool,
            generator,
            publisher,
            notifier,
            settings,
        }
    }

    /// Build every collaborator from configuration.
    ///
    /// Missing credentials are not an error here; they surface as
    /// configuration failures when a flow needs them.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a base URL or repository setting is
    /// malformed or an HTTP client cannot be built.
    pub fn from_app_config(pool: PgPool, config: &AppConfig) -> Result<Self, PipelineError> {
        let generator = GeminiClient::from_app_config(config)?;
        let publisher = Publisher::from_app_config(config)
            .map_err(|e| PipelineError::Publish(PublishError::Store(e)))?;
        let notifier = Notifier::new(config.notify_webhook_url.clone())?;
        Ok(Self::new(
            pool,
            generator,
            publisher,
            notifier,
            PipelineSettings::from_app_config(config),
        ))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[must_use]
    pub fn generator(&self) -> &GeminiClient {
        &self.generator
    }

    // -----------------------------------------------------------------------
    // Flow A: write
    // -----------------------------------------------------------------------

    /// Claim the next ready topic, generate its article, and save the draft.
    pub async fn run_write_flow(&self) -> FlowOutcome {
        if !self.generator.is_configured() {
            return missing_generator_key();
        }

        let topic = match quill_db::claim_next_topic(&self.pool, CLAIMED_MARKER).await {
            Ok(Some(topic)) => topic,
            Ok(None) => {
                tracing::info!("pipeline: no ready topic");
                return FlowOutcome::Idle;
            }
            Err(e) => return failed(&PipelineError::from(e), None, None),
        };

        self.process_topic(topic).await
    }

    /// Like [`Pipeline::run_write_flow`] for one specific topic.
    ///
    /// The topic is claimed with a conditional update, so a topic another
    /// worker holds is reported as unavailable rather than processed twice.
    pub async fn run_write_flow_for(&self, topic_id: i64) -> FlowOutcome {
        if !self.generator.is_configured() {
            return missing_generator_key();
        }

        match quill_db::claim_topic_by_id(&self.pool, topic_id, CLAIMED_MARKER).await {
            Ok(Some(topic)) => self.process_topic(topic).await,
            Ok(None) => failed(&PipelineError::TopicUnavailable(topic_id), Some(topic_id), None),
            Err(e) => failed(&PipelineError::from(e), Some(topic_id), None),
        }
    }

    async fn process_topic(&self, topic: TopicRow) -> FlowOutcome {
        tracing::info!(topic_id = topic.id, title = %topic.title, "pipeline: topic claimed");

        match self.write_topic(&topic).await {
            Ok(draft) => FlowOutcome::Processed {
                topic_id: Some(topic.id),
                draft_id: draft.id,
            },
            Err(e) => {
                tracing::error!(topic_id = topic.id, error = %e, "pipeline: write flow failed");
                let marker = format!("failed, will retry: {e}");
                if let Err(release) = quill_db::release_topic(&self.pool, topic.id, &marker).await
                {
                    tracing::error!(
                        topic_id = topic.id,
                        error = %release,
                        "pipeline: failed to release topic"
                    );
                }
                failed(&e, Some(topic.id), None)
            }
        }
    }

    async fn write_topic(&self, topic: &TopicRow) -> Result<DraftRow, PipelineError> {
        quill_db::set_topic_progress(&self.pool, topic.id, GENERATING_MARKER).await?;

        let request = ArticleRequest {
            topic: &topic.title,
            keywords: &topic.keywords,
            notes: topic.research_notes.as_deref(),
            scope_description: Some(topic.description.as_str()).filter(|d| !d.trim().is_empty()),
            reference_images: &topic.reference_images.0,
            target_length: self.settings.target_length,
        };
        let article = self.generator.generate_article(&request).await?;

        quill_db::set_topic_progress(&self.pool, topic.id, SAVING_MARKER).await?;
        let draft = materialize(
            &self.pool,
            topic,
            &article,
            self.settings.write_mode,
            self.settings.target_length,
            Utc::now(),
        )
        .await?;
        Ok(draft)
    }

    // -----------------------------------------------------------------------
    // Flow B: publish
    // -----------------------------------------------------------------------

    /// Claim and commit the earliest due scheduled draft, if any.
    ///
    /// The claim is atomic, so concurrent publish flows never commit the same
    /// draft.
    pub async fn run_publish_flow(&self) -> FlowOutcome {
        if let Err(e) = self.publisher.ensure_configured() {
            return failed(&PipelineError::Publish(e.into()), None, None);
        }

        let now = Utc::now();
        let draft = match quill_db::claim_due_draft(&self.pool, now).await {
            Ok(Some(draft)) => draft,
            Ok(None) => {
                tracing::info!("pipeline: no draft due");
                return FlowOutcome::Idle;
            }
            Err(e) => return failed(&PipelineError::from(e), None, None),
        };
        tracing::info!(draft_id = draft.id, slug = %draft.slug, "pipeline: publishing draft");

        let commit = match self.publisher.commit(&draft, now).await {
            Ok(commit) => commit,
            Err(e) => return self.park_failed_publish(&draft, PipelineError::Publish(e)).await,
        };

        if let Err(e) = quill_db::mark_draft_published(
            &self.pool,
            draft.id,
            now,
            &commit.commit_url,
            &commit.revision_id,
        )
        .await
        {
            // The file is committed; once the claim expires the next tick
            // re-commits the same content.
            tracing::error!(
                draft_id = draft.id,
                commit_url = %commit.commit_url,
                error = %e,
                "pipeline: commit succeeded but draft was not marked published"
            );
            return failed(&PipelineError::from(e), None, Some(draft.id));
        }

        self.notifier.notify_published(PublishedNotice {
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            commit_url: commit.commit_url,
        });

        FlowOutcome::Processed {
            topic_id: None,
            draft_id: draft.id,
        }
    }

    async fn park_failed_publish(&self, draft: &DraftRow, error: PipelineError) -> FlowOutcome {
        let reason = error.to_string();
        let kind = error.kind();

        let recorded = if kind == FailureKind::Precondition {
            tracing::warn!(draft_id = draft.id, reason = %reason, "pipeline: draft failed precondition");
            quill_db::mark_draft_failed(&self.pool, draft.id, &reason).await
        } else {
            tracing::error!(draft_id = draft.id, error = %reason, "pipeline: publish failed");
            quill_db::record_draft_error(&self.pool, draft.id, &reason).await
        };
        if let Err(e) = recorded {
            tracing::error!(draft_id = draft.id, error = %e, "pipeline: failed to record publish failure");
        }

        failed(&error, None, Some(draft.id))
    }

    // -----------------------------------------------------------------------
    // Invocation
    // -----------------------------------------------------------------------

    /// Run the write flow, then the publish flow regardless of how the write
    /// flow ended.
    pub async fn run_invocation(&self) -> InvocationReport {
        let write = self.run_write_flow().await;
        let publish = self.run_publish_flow().await;
        InvocationReport { write, publish }
    }
}

fn missing_generator_key() -> FlowOutcome {
    tracing::error!("pipeline: GEMINI_API_KEY is not set; write flow skipped");
    failed(
        &PipelineError::Generation(quill_gemini::GeminiError::MissingApiKey),
        None,
        None,
    )
}

fn failed(error: &PipelineError, topic_id: Option<i64>, draft_id: Option<i64>) -> FlowOutcome {
    FlowOutcome::Failed {
        kind: error.kind(),
        reason: error.to_string(),
        topic_id,
        draft_id,
    }
}
