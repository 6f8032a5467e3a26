//! Published document assembly: front-matter header plus sanitized body.

use chrono::{DateTime, Utc};
use quill_core::{sanitize, DraftExtension};
use quill_db::DraftRow;

const DEFAULT_LAYOUT: &str = "standard";

/// Quote a front-matter value, escaping backslashes and double quotes.
///
/// Line breaks are folded to spaces so every value stays on one line.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => {}
            '\n' => out.push(' '),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// "October 2026" style month label.
#[must_use]
pub fn publish_month(now: DateTime<Utc>) -> String {
    now.format("%B %Y").to_string()
}

/// Front-matter block for `draft`, fenced by `---` lines.
#[must_use]
pub fn front_matter(draft: &DraftRow, now: DateTime<Utc>) -> String {
    let ext = DraftExtension::from_value(&draft.extension);
    let today = now.format("%Y-%m-%d").to_string();

    let fields: [(&str, String); 10] = [
        ("title", draft.title.trim().to_string()),
        ("description", draft.meta_description.clone()),
        ("date", today.clone()),
        ("lastUpdated", today),
        ("publishMonth", publish_month(now)),
        ("category", draft.category.clone()),
        ("featuredImage", draft.featured_image.clone()),
        ("imageCaption", ext.image_caption.unwrap_or_default()),
        ("readTime", draft.read_time.clone()),
        (
            "layout",
            ext.layout
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LAYOUT.to_string()),
        ),
    ];

    let mut out = String::from("---\n");
    for (key, value) in &fields {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&quote(value));
        out.push('\n');
    }
    out.push_str(&format!(
        "showArticleSummary: {}\n",
        ext.show_article_summary.unwrap_or(true)
    ));
    out.push_str("---\n");
    out
}

/// The full file committed for `draft`.
#[must_use]
pub fn render_document(draft: &DraftRow, now: DateTime<Utc>) -> String {
    format!("{}\n{}\n", front_matter(draft, now), sanitize(&draft.content))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use sqlx::types::Uuid;

    use super::*;

    fn draft() -> DraftRow {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        DraftRow {
            id: 1,
            public_id: Uuid::nil(),
            topic_id: Some(3),
            slug: "steel-vs-wood".to_string(),
            title: "Steel vs. \"Wood\"".to_string(),
            meta_description: "Which frame lasts longer?".to_string(),
            content: "# Steel vs. Wood\n\n## Cost\n\nSteel costs more.".to_string(),
            category: "Construction".to_string(),
            featured_image: "https://img.example/frame.jpg".to_string(),
            read_time: "6 min read".to_string(),
            extension: serde_json::json!({
                "imageCaption": "A C:\\frames shot",
                "showArticleSummary": false
            }),
            status: "scheduled".to_string(),
            scheduled_publish_at: Some(at),
            published_at: None,
            commit_url: None,
            commit_sha: None,
            last_error: None,
            completeness: None,
            publish_claimed_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap()
    }

    #[test]
    fn quote_escapes_quotes_and_backslashes() {
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote(r"C:\dir"), r#""C:\\dir""#);
        assert_eq!(quote("two\r\nlines"), r#""two lines""#);
    }

    #[test]
    fn publish_month_is_long_month_and_year() {
        assert_eq!(publish_month(now()), "October 2026");
    }

    #[test]
    fn front_matter_lists_every_field_in_order() {
        let expected = concat!(
            "---\n",
            "title: \"Steel vs. \\\"Wood\\\"\"\n",
            "description: \"Which frame lasts longer?\"\n",
            "date: \"2026-10-16\"\n",
            "lastUpdated: \"2026-10-16\"\n",
            "publishMonth: \"October 2026\"\n",
            "category: \"Construction\"\n",
            "featuredImage: \"https://img.example/frame.jpg\"\n",
            "imageCaption: \"A C:\\\\frames shot\"\n",
            "readTime: \"6 min read\"\n",
            "layout: \"standard\"\n",
            "showArticleSummary: false\n",
            "---\n",
        );
        assert_eq!(front_matter(&draft(), now()), expected);
    }

    #[test]
    fn document_is_front_matter_blank_line_and_sanitized_body() {
        let doc = render_document(&draft(), now());
        assert!(doc.ends_with("---\n\n## Cost\n\nSteel costs more.\n"), "got {doc}");
        assert!(!doc.contains("# Steel vs. Wood\n"));
    }
}
