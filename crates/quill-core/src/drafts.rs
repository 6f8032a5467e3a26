use serde::{Deserialize, Serialize};

/// Lifecycle of a draft article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Draft,
    Review,
    Scheduled,
    Published,
    Failed,
}

impl DraftStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Review => "review",
            DraftStatus::Scheduled => "scheduled",
            DraftStatus::Published => "published",
            DraftStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DraftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DraftStatus::Draft),
            "review" => Ok(DraftStatus::Review),
            "scheduled" => Ok(DraftStatus::Scheduled),
            "published" => Ok(DraftStatus::Published),
            "failed" => Ok(DraftStatus::Failed),
            other => Err(format!("unknown draft status '{other}'")),
        }
    }
}

/// Presentation hints stored in the draft's `extension` JSONB column.
///
/// Unknown keys written by other tools are preserved by callers that
/// round-trip the raw JSON; this struct only names the keys the pipeline
/// reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_article_summary: Option<bool>,
}

impl DraftExtension {
    /// Read the known keys out of an arbitrary JSON value, ignoring anything
    /// malformed.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}
