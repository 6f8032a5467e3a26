//! Prompt text sent to the generation backend.

use std::fmt::Write as _;

use crate::types::ArticleRequest;

const FORMATTING_RULES: &str = "\
FORMATTING RULES (follow exactly):
- Do not repeat the title as a level-1 heading; the title is rendered separately.
- Use `## ` for section headings and `### ` for sub-sections. Never use `# `.
- Callouts use a blockquote whose first line is a bold label, e.g. `> **Tip:** ...`.
- Tables use GitHub-flavoured Markdown pipe syntax with a header separator row.
- Images use `![alt text](url)` on their own line. Never write `!` without `[`.
- Do not put layout, caption, or other metadata lines inside the content.";

const RESPONSE_SHAPE: &str = r#"Respond with ONLY a JSON object, no code fence and no commentary, of this shape:
{
  "title": "article title",
  "content": "full Markdown body",
  "metaDescription": "150-160 character search snippet",
  "category": "single category name",
  "readTime": "N min read",
  "featuredImage": "url of the best reference image, or empty string",
  "imageCaption": "caption for the featured image",
  "layout": "standard",
  "showArticleSummary": true
}"#;

/// Build the article-generation prompt.
#[must_use]
pub fn article_prompt(request: &ArticleRequest<'_>) -> String {
    let mut prompt = String::with_capacity(4096);

    let _ = writeln!(
        prompt,
        "You are an experienced editor writing a long-form blog article."
    );
    let _ = writeln!(prompt, "\nTOPIC: {}", request.topic);

    if !request.keywords.is_empty() {
        let _ = writeln!(prompt, "KEYWORDS: {}", request.keywords.join(", "));
    }
    if let Some(scope) = request.scope_description.filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(prompt, "SCOPE: {scope}");
    }
    if let Some(notes) = request.notes.filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(prompt, "\nRESEARCH NOTES:\n{notes}");
    }
    if !request.reference_images.is_empty() {
        let _ = writeln!(
            prompt,
            "\nREFERENCE IMAGES (embed the relevant ones inline and pick one as featuredImage):"
        );
        for image in request.reference_images {
            if image.description.is_empty() {
                let _ = writeln!(prompt, "- {}", image.url);
            } else {
                let _ = writeln!(prompt, "- {} ({})", image.url, image.description);
            }
        }
    }

    let _ = writeln!(
        prompt,
        "\nLENGTH: roughly {} words of body content.",
        request.target_length
    );
    let _ = writeln!(prompt, "\n{FORMATTING_RULES}");
    let _ = write!(prompt, "\n{RESPONSE_SHAPE}");

    prompt
}

/// Build the prompt that turns a one-line idea into a topic.
#[must_use]
pub fn investigate_prompt(idea: &str) -> String {
    format!(
        "Turn this rough article idea into a publishable blog topic.\n\n\
         IDEA: {idea}\n\n\
         Respond with ONLY a JSON object of this shape:\n\
         {{\"title\": \"clear article title\", \"description\": \"two-sentence scope\", \
         \"keywords\": [\"keyword\", \"keyword\"]}}"
    )
}

/// Build the prompt asking for fresh topic ideas.
#[must_use]
pub fn suggest_prompt() -> String {
    "Suggest ten fresh blog article ideas for a site about garden buildings, \
     outdoor structures, and home improvement. Respond with ONLY a JSON array \
     of strings, one idea per string."
        .to_string()
}
