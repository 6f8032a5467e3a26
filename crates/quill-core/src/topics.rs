use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::article::ReferenceImage;
use crate::ConfigError;

/// Lifecycle of a topic.
///
/// Transitions only move forward along `preparing → ready → in_progress →
/// completed`, except that a failed generation returns `in_progress` to
/// `ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    Preparing,
    Ready,
    InProgress,
    Completed,
}

impl TopicStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TopicStatus::Preparing => "preparing",
            TopicStatus::Ready => "ready",
            TopicStatus::InProgress => "in_progress",
            TopicStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TopicStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparing" => Ok(TopicStatus::Preparing),
            "ready" => Ok(TopicStatus::Ready),
            "in_progress" => Ok(TopicStatus::InProgress),
            "completed" => Ok(TopicStatus::Completed),
            other => Err(format!("unknown topic status '{other}'")),
        }
    }
}

/// A topic as written in the seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSeed {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub research_notes: Option<String>,
    #[serde(default)]
    pub reference_images: Vec<ReferenceImage>,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Deserialize)]
pub struct TopicsFile {
    pub topics: Vec<TopicSeed>,
}

/// Load and validate a topics seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_topics(path: &Path) -> Result<TopicsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TopicsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_topics(&content)
}

/// Parse and validate topics seed YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_topics(yaml: &str) -> Result<TopicsFile, ConfigError> {
    let topics_file: TopicsFile = serde_yaml::from_str(yaml).map_err(ConfigError::TopicsFileParse)?;
    validate_topics(&topics_file)?;
    Ok(topics_file)
}

fn validate_topics(topics_file: &TopicsFile) -> Result<(), ConfigError> {
    let mut seen_titles = HashSet::new();

    for topic in &topics_file.topics {
        let title = topic.title.trim();
        if title.is_empty() {
            return Err(ConfigError::Validation(
                "topic title must be non-empty".to_string(),
            ));
        }

        if !seen_titles.insert(title.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate topic title: '{title}'"
            )));
        }

        if let Some(image) = topic.reference_images.iter().find(|i| i.url.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "topic '{title}' has a reference image with an empty url ({})",
                image.description
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_status_round_trips_through_str() {
        for status in [
            TopicStatus::Preparing,
            TopicStatus::Ready,
            TopicStatus::InProgress,
            TopicStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TopicStatus>(), Ok(status));
        }
        assert!("approved".parse::<TopicStatus>().is_err());
    }

    #[test]
    fn parse_topics_applies_defaults() {
        let yaml = r"
topics:
  - title: Choosing timber for outdoor decks
    keywords: [decking, timber]
    priority: 5
  - title: Steel framing basics
";
        let file = parse_topics(yaml).expect("parse");
        assert_eq!(file.topics.len(), 2);
        assert_eq!(file.topics[0].priority, 5);
        assert_eq!(file.topics[0].keywords, vec!["decking", "timber"]);
        assert_eq!(file.topics[1].priority, 0);
        assert!(file.topics[1].description.is_empty());
        assert!(file.topics[1].reference_images.is_empty());
    }

    #[test]
    fn parse_topics_rejects_empty_title() {
        let yaml = "topics:\n  - title: '  '\n";
        let err = parse_topics(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn parse_topics_rejects_duplicate_titles_case_insensitively() {
        let yaml = "topics:\n  - title: Deck Care\n  - title: deck care\n";
        let err = parse_topics(yaml).unwrap_err();
        assert!(
            err.to_string().contains("duplicate topic title"),
            "got {err}"
        );
    }

    #[test]
    fn parse_topics_rejects_image_without_url() {
        let yaml = r#"
topics:
  - title: Deck Care
    reference_images:
      - url: ""
        description: a deck
"#;
        let err = parse_topics(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn parse_topics_reports_malformed_yaml() {
        let err = parse_topics("topics: [").unwrap_err();
        assert!(matches!(err, ConfigError::TopicsFileParse(_)), "got {err:?}");
    }

    #[test]
    fn load_topics_from_example_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../config/topics.example.yaml");
        let file = load_topics(&path).expect("failed to load topics.example.yaml");
        assert!(!file.topics.is_empty());
    }

    #[test]
    fn load_topics_missing_file_is_io_error() {
        let err = load_topics(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::TopicsFileIo { .. }), "got {err:?}");
    }
}
