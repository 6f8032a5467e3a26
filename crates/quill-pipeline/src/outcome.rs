//! Structured results of pipeline invocations.

use serde::Serialize;

/// Error taxonomy reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Missing credential or connection setting. Needs an operator.
    Configuration,
    /// Backend or datastore trouble; state was reverted for the next run.
    Transient,
    /// The unit itself is invalid and was parked as `failed`.
    Precondition,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transient => "transient",
            Self::Precondition => "precondition",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one flow did during one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// No eligible topic or draft.
    Idle,
    /// Exactly one unit was processed.
    Processed {
        topic_id: Option<i64>,
        draft_id: i64,
    },
    /// The unit failed; any claimed state has been reverted or parked.
    Failed {
        kind: FailureKind,
        reason: String,
        topic_id: Option<i64>,
        draft_id: Option<i64>,
    },
}

impl FlowOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Wire shape returned by the trigger endpoints and printed by the CLI.
    #[must_use]
    pub fn summary(&self) -> FlowSummary {
        match self {
            Self::Idle => FlowSummary {
                processed: 0,
                topic_id: None,
                draft_id: None,
                error: None,
                error_kind: None,
            },
            Self::Processed { topic_id, draft_id } => FlowSummary {
                processed: 1,
                topic_id: *topic_id,
                draft_id: Some(*draft_id),
                error: None,
                error_kind: None,
            },
            Self::Failed {
                kind,
                reason,
                topic_id,
                draft_id,
            } => FlowSummary {
                processed: 0,
                topic_id: *topic_id,
                draft_id: *draft_id,
                error: Some(reason.clone()),
                error_kind: Some(*kind),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub processed: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

/// Both flows of one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReport {
    pub write: FlowOutcome,
    pub publish: FlowOutcome,
}

impl InvocationReport {
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.write.is_failure() || self.publish.is_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_summary_is_zero_with_no_ids() {
        let json = serde_json::to_value(FlowOutcome::Idle.summary()).expect("serialize");
        assert_eq!(json, serde_json::json!({ "processed": 0 }));
    }

    #[test]
    fn processed_summary_carries_ids() {
        let outcome = FlowOutcome::Processed {
            topic_id: Some(4),
            draft_id: 9,
        };
        let json = serde_json::to_value(outcome.summary()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "processed": 1, "topicId": 4, "draftId": 9 })
        );
    }

    #[test]
    fn failed_summary_reports_reason_and_kind() {
        let outcome = FlowOutcome::Failed {
            kind: FailureKind::Transient,
            reason: "generation failed: all 3 endpoints failed".to_string(),
            topic_id: Some(2),
            draft_id: None,
        };
        assert!(outcome.is_failure());
        let json = serde_json::to_value(outcome.summary()).expect("serialize");
        assert_eq!(json["processed"], 0);
        assert_eq!(json["topicId"], 2);
        assert_eq!(json["errorKind"], "transient");
        assert!(json.get("draftId").is_none());
    }

    #[test]
    fn report_flags_any_failed_flow() {
        let report = InvocationReport {
            write: FlowOutcome::Failed {
                kind: FailureKind::Configuration,
                reason: "missing key".to_string(),
                topic_id: None,
                draft_id: None,
            },
            publish: FlowOutcome::Idle,
        };
        assert!(report.has_failure());
    }
}
