use super::*;

#[test]
fn plain_markdown_passes_through() {
    let body = "## Planning\n\nStart with the footprint.\n\n![Site plan](https://img.example/plan.jpg)";
    assert_eq!(sanitize(body), body);
}

#[test]
fn fenced_json_envelope_is_unwrapped() {
    let raw = "```json\n{\"content\": \"Body text\"}\n```";
    assert_eq!(sanitize(raw), "Body text");
}

#[test]
fn bare_json_envelope_is_unwrapped_and_unescaped() {
    let raw = r###"{"title":"Decks","content":"## Intro\n\nA \"quoted\" word\\path"}"###;
    assert_eq!(sanitize(raw), "## Intro\n\nA \"quoted\" word\\path");
}

#[test]
fn truncated_envelope_keeps_partial_content() {
    let raw = "```json\n{\"title\": \"Decks\", \"content\": \"## Intro\\n\\nBody text";
    assert_eq!(sanitize(raw), "## Intro\n\nBody text");
}

#[test]
fn truncated_envelope_drops_trailing_brace() {
    let raw = "{\"content\": \"Body text}";
    assert_eq!(sanitize(raw), "Body text");
}

#[test]
fn unicode_escapes_are_decoded() {
    let raw = r#"{"content": "Caf\u00e9 terrace"}"#;
    assert_eq!(sanitize(raw), "Café terrace");
}

#[test]
fn envelope_without_content_fails_open() {
    let raw = "{\"title\": \"Decks\"}";
    assert_eq!(sanitize(raw), raw);
}

#[test]
fn envelope_with_blank_content_fails_open() {
    let raw = "{\"content\": \"   \"}";
    assert_eq!(sanitize(raw), raw);
}

#[test]
fn article_opening_with_fenced_json_example_is_kept() {
    let body = "```json\n{\"content\": \"x\"}\n```\n\n## Using the API\n\nThe request body above is all you need.";
    assert_eq!(sanitize(body), body);
}

#[test]
fn bare_json_example_followed_by_prose_is_kept() {
    let body = "{\"content\": \"x\", \"meta\": {\"a\": 1}}\n\nThat object is the whole payload.";
    assert_eq!(sanitize(body), body);
}

#[test]
fn envelope_truncated_after_content_is_unwrapped() {
    let raw = "```json\n{\"content\": \"## Intro\\n\\nBody\", \"category\": \"Gui";
    assert_eq!(sanitize(raw), "## Intro\n\nBody");
}

#[test]
fn content_mention_in_prose_is_not_unwrapped() {
    let body = "Writing good \"content\" takes time.";
    assert_eq!(sanitize(body), body);
}

#[test]
fn leading_h1_is_removed_but_h2_kept() {
    assert_eq!(sanitize("# Title\n\n## Section\n\nText"), "## Section\n\nText");
    assert_eq!(sanitize("## Section\n\nText"), "## Section\n\nText");
}

#[test]
fn h1_inside_body_is_kept() {
    let body = "Intro paragraph.\n\n# Not the title";
    assert_eq!(sanitize(body), body);
}

#[test]
fn metadata_lines_are_removed() {
    let raw = "layout: wide\n\"showArticleSummary\": true\nimageCaption: A deck\n  featuredImage: https://x/y.jpg\nBody stays";
    assert_eq!(sanitize(raw), "Body stays");
}

#[test]
fn metadata_key_mid_line_is_kept() {
    let body = "The page layout: simple and clean.";
    assert_eq!(sanitize(body), body);
}

#[test]
fn malformed_image_lines_are_removed() {
    let raw = "Intro\n!Broken image no brackets\n![Valid](url.jpg)\nOutro";
    assert_eq!(sanitize(raw), "Intro\n![Valid](url.jpg)\nOutro");
}

#[test]
fn excess_blank_lines_collapse() {
    assert_eq!(sanitize("A\n\n\n\n\nB"), "A\n\nB");
    assert_eq!(sanitize("A\n\n \n\t\n\nB"), "A\n\nB");
}

#[test]
fn two_blank_lines_are_preserved() {
    assert_eq!(sanitize("A\n\n\nB"), "A\n\n\nB");
}

#[test]
fn output_is_trimmed() {
    assert_eq!(sanitize("\n\n  Body  \n\n"), "Body");
}

#[test]
fn empty_input_stays_empty() {
    assert_eq!(sanitize(""), "");
}

#[test]
fn sanitize_is_idempotent() {
    let inputs = [
        "```json\n{\"content\": \"# Title\\n\\nlayout: wide\\n\\n\\n\\n\\nBody\"}\n```",
        "# One\n# Two\n\nBody",
        "{\"content\": \"{\\\"content\\\": \\\"nested\\\"}\"}",
        "!bad\n![good](a.png)\n\n\n\n\nend",
        "plain text",
        "{\"content\": \"Body text",
    ];
    for input in inputs {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn nested_envelope_unwraps_fully() {
    let raw = "{\"content\": \"{\\\"content\\\": \\\"nested\\\"}\"}";
    assert_eq!(sanitize(raw), "nested");
}

#[test]
fn strip_code_fence_handles_language_tags() {
    assert_eq!(strip_code_fence("```json\n{}\n```"), Some("{}"));
    assert_eq!(strip_code_fence("```\n{}\n```"), Some("{}"));
    assert_eq!(strip_code_fence("```json{}```"), Some("{}"));
    assert_eq!(strip_code_fence("```json\n{}"), Some("{}"));
    assert_eq!(strip_code_fence("{}"), None);
}

#[test]
fn extract_string_field_finds_named_field() {
    let text = r#"{"title": "Deck \"care\"", "content": "x"}"#;
    assert_eq!(
        extract_string_field(text, "title").as_deref(),
        Some("Deck \"care\"")
    );
    assert_eq!(extract_string_field(text, "missing"), None);
}
