use serde::{Deserialize, Serialize};

/// A reference image attached to a topic and offered to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// A generated article after response recovery and default filling.
///
/// Every field is populated; `content` is never empty and never starts with
/// `{`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResult {
    pub title: String,
    pub content: String,
    pub meta_description: String,
    pub category: String,
    pub read_time: String,
    pub featured_image: String,
    pub image_caption: String,
    pub layout: String,
    pub show_article_summary: bool,
}
