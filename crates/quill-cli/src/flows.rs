//! Pipeline flow commands.
//!
//! Each command runs a single flow invocation, prints its summary as JSON on
//! stdout and exits non-zero when the unit of work failed.

use quill_core::AppConfig;
use quill_pipeline::{FlowOutcome, Pipeline};
use sqlx::PgPool;

/// Run the write flow, optionally targeting one topic by id.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built, the summary cannot be
/// serialized, or the flow reported a failure.
pub(crate) async fn run_write(
    pool: PgPool,
    config: &AppConfig,
    topic: Option<i64>,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_app_config(pool, config)?;
    let outcome = match topic {
        Some(id) => pipeline.run_write_flow_for(id).await,
        None => pipeline.run_write_flow().await,
    };
    report_outcome("write", &outcome)
}

/// Run the publish flow once.
///
/// # Errors
///
/// Same as [`run_write`].
pub(crate) async fn run_publish(pool: PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_app_config(pool, config)?;
    let outcome = pipeline.run_publish_flow().await;
    report_outcome("publish", &outcome)
}

/// Run both flows in order; the publish flow runs even if the write flow
/// failed.
///
/// # Errors
///
/// Returns an error if either flow failed.
pub(crate) async fn run_invocation(pool: PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_app_config(pool, config)?;
    let report = pipeline.run_invocation().await;

    let body = serde_json::json!({
        "write": report.write.summary(),
        "publish": report.publish.summary(),
    });
    println!("{}", serde_json::to_string_pretty(&body)?);

    if report.has_failure() {
        anyhow::bail!("pipeline run finished with a failed flow");
    }
    Ok(())
}

fn report_outcome(flow: &str, outcome: &FlowOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&outcome.summary())?);

    match outcome {
        FlowOutcome::Failed { kind, reason, .. } => {
            anyhow::bail!("{flow} flow failed ({kind}): {reason}")
        }
        FlowOutcome::Idle => {
            tracing::info!(flow, "nothing to do");
            Ok(())
        }
        FlowOutcome::Processed { .. } => Ok(()),
    }
}
