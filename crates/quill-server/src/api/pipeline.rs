//! Trigger endpoints for the scheduler flows.
//!
//! Each returns 200 for "no eligible work" and "processed one unit", and 500
//! with the same body shape when the unit failed.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use quill_pipeline::{FlowOutcome, FlowSummary};
use serde::Serialize;

use super::{AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
struct TriggerResponse {
    #[serde(flatten)]
    summary: FlowSummary,
    meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
struct RunResponse {
    write: FlowSummary,
    publish: FlowSummary,
    meta: ResponseMeta,
}

fn status_for(failed: bool) -> StatusCode {
    if failed {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

fn flow_response(outcome: &FlowOutcome, req_id: RequestId) -> impl IntoResponse {
    (
        status_for(outcome.is_failure()),
        Json(TriggerResponse {
            summary: outcome.summary(),
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

pub(super) async fn trigger_write(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let outcome = state.pipeline.run_write_flow().await;
    tracing::info!(request_id = %req_id.0, outcome = ?outcome, "pipeline: write trigger finished");
    flow_response(&outcome, req_id)
}

pub(super) async fn trigger_publish(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let outcome = state.pipeline.run_publish_flow().await;
    tracing::info!(request_id = %req_id.0, outcome = ?outcome, "pipeline: publish trigger finished");
    flow_response(&outcome, req_id)
}

pub(super) async fn trigger_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let report = state.pipeline.run_invocation().await;
    tracing::info!(request_id = %req_id.0, report = ?report, "pipeline: run trigger finished");
    (
        status_for(report.has_failure()),
        Json(RunResponse {
            write: report.write.summary(),
            publish: report.publish.summary(),
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}
