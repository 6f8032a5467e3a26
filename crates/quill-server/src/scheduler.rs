//! Background job scheduler.
//!
//! Registers one cron job per pipeline flow. Each tick is an independent
//! invocation; overlapping ticks are safe because topic claims are atomic.

use std::sync::Arc;

use quill_pipeline::{FlowOutcome, Pipeline};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pipeline: Arc<Pipeline>,
    config: &quill_core::AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_write_job(&scheduler, Arc::clone(&pipeline), &config.write_cron).await?;
    register_publish_job(&scheduler, pipeline, &config.publish_cron).await?;

    scheduler.start().await?;
    tracing::info!(
        write_cron = %config.write_cron,
        publish_cron = %config.publish_cron,
        "scheduler: started"
    );
    Ok(scheduler)
}

async fn register_write_job(
    scheduler: &JobScheduler,
    pipeline: Arc<Pipeline>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            tracing::debug!("scheduler: write tick");
            let outcome = pipeline.run_write_flow().await;
            log_outcome("write", &outcome);
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn register_publish_job(
    scheduler: &JobScheduler,
    pipeline: Arc<Pipeline>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            tracing::debug!("scheduler: publish tick");
            let outcome = pipeline.run_publish_flow().await;
            log_outcome("publish", &outcome);
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

fn log_outcome(flow: &'static str, outcome: &FlowOutcome) {
    match outcome {
        FlowOutcome::Idle => tracing::debug!(flow, "scheduler: nothing to do"),
        FlowOutcome::Processed { topic_id, draft_id } => {
            tracing::info!(flow, ?topic_id, draft_id, "scheduler: unit processed");
        }
        FlowOutcome::Failed {
            kind,
            reason,
            topic_id,
            draft_id,
        } => tracing::error!(
            flow,
            kind = %kind,
            ?topic_id,
            ?draft_id,
            error = %reason,
            "scheduler: unit failed"
        ),
    }
}
