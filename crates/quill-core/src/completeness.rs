//! Weighted completeness score for a draft article.
//!
//! Scores range from 0 to 100. The score is advisory only: it is recomputed
//! from the draft's fields every time the draft is materialized and nothing in
//! the pipeline gates on it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Weight constants (must sum to exactly 100)
// ---------------------------------------------------------------------------

/// Title is non-blank.
pub const W_TITLE: u32 = 15;
/// Meta description is 50-160 characters (half credit when present but out of range).
pub const W_META_DESCRIPTION: u32 = 15;
/// Body word count reaches the target length (pro-rated below it).
pub const W_BODY_LENGTH: u32 = 30;
/// At least two `##` section headings.
pub const W_SECTIONS: u32 = 10;
/// Featured image URL is non-blank.
pub const W_FEATURED_IMAGE: u32 = 10;
/// Category is non-blank.
pub const W_CATEGORY: u32 = 5;
/// Body contains at least one well-formed inline image.
pub const W_INLINE_IMAGE: u32 = 5;
/// Slug is non-empty.
pub const W_SLUG: u32 = 10;

const _: () = assert!(
    W_TITLE
        + W_META_DESCRIPTION
        + W_BODY_LENGTH
        + W_SECTIONS
        + W_FEATURED_IMAGE
        + W_CATEGORY
        + W_INLINE_IMAGE
        + W_SLUG
        == 100,
    "completeness weights must sum to exactly 100"
);

const META_MIN_CHARS: usize = 50;
const META_MAX_CHARS: usize = 160;
const MIN_SECTIONS: usize = 2;

static INLINE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)\s]+\)").expect("valid inline image regex"));

/// Fields of a draft that feed the score.
#[derive(Debug, Clone, Copy)]
pub struct CompletenessInput<'a> {
    pub title: &'a str,
    pub meta_description: &'a str,
    pub content: &'a str,
    pub featured_image: &'a str,
    pub category: &'a str,
    pub slug: &'a str,
    /// Target body length in words.
    pub target_words: u32,
}

/// Score breakdown stored alongside the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct DraftCompleteness {
    /// 0-100 weighted score.
    pub score: u32,
    pub word_count: u32,
    pub section_count: u32,
    pub has_title: bool,
    pub meta_description_in_range: bool,
    pub has_featured_image: bool,
    pub has_category: bool,
    pub has_inline_image: bool,
    pub has_slug: bool,
}

/// Compute the completeness breakdown for a draft.
#[must_use]
pub fn score_draft(input: &CompletenessInput<'_>) -> DraftCompleteness {
    let word_count = u32::try_from(input.content.split_whitespace().count()).unwrap_or(u32::MAX);
    let section_count = input
        .content
        .lines()
        .filter(|line| line.trim_start().starts_with("## "))
        .count();

    let has_title = !input.title.trim().is_empty();
    let meta_len = input.meta_description.trim().chars().count();
    let meta_description_in_range = (META_MIN_CHARS..=META_MAX_CHARS).contains(&meta_len);
    let has_featured_image = !input.featured_image.trim().is_empty();
    let has_category = !input.category.trim().is_empty();
    let has_inline_image = INLINE_IMAGE.is_match(input.content);
    let has_slug = !input.slug.trim().is_empty();

    let mut score = 0;
    if has_title {
        score += W_TITLE;
    }
    if meta_description_in_range {
        score += W_META_DESCRIPTION;
    } else if meta_len > 0 {
        score += W_META_DESCRIPTION / 2;
    }
    score += body_length_points(word_count, input.target_words);
    if section_count >= MIN_SECTIONS {
        score += W_SECTIONS;
    }
    if has_featured_image {
        score += W_FEATURED_IMAGE;
    }
    if has_category {
        score += W_CATEGORY;
    }
    if has_inline_image {
        score += W_INLINE_IMAGE;
    }
    if has_slug {
        score += W_SLUG;
    }

    DraftCompleteness {
        score,
        word_count,
        section_count: u32::try_from(section_count).unwrap_or(u32::MAX),
        has_title,
        meta_description_in_range,
        has_featured_image,
        has_category,
        has_inline_image,
        has_slug,
    }
}

fn body_length_points(word_count: u32, target_words: u32) -> u32 {
    if target_words == 0 || word_count >= target_words {
        return W_BODY_LENGTH;
    }
    let points = u64::from(W_BODY_LENGTH) * u64::from(word_count) / u64::from(target_words);
    u32::try_from(points).unwrap_or(W_BODY_LENGTH)
}
