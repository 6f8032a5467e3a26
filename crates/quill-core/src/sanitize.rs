//! Clean-up of generated article bodies before they are stored or published.
//!
//! The generation backend occasionally leaks its JSON envelope into the body,
//! repeats the title as a level-1 heading, leaves scalar front-matter keys
//! behind, or emits image syntax without the bracketed alt text. [`sanitize`]
//! undoes all of these. It is total: malformed input is returned with only the
//! transforms that apply, never an error and never an empty result caused by
//! a spurious envelope match.

use std::sync::LazyLock;

use regex::Regex;

static METADATA_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"?(?:layout|showArticleSummary|imageCaption|featuredImage)"?\s*:"#)
        .expect("valid metadata line regex")
});

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t\r]*\n){3,}").expect("valid blank line regex"));

/// Sanitize a generated article body.
///
/// Applied in order, repeated until the text stops changing:
///
/// 1. unwrap a leaked structured-output envelope (`{"content": "..."}`,
///    optionally fenced, possibly truncated) to its `content` string;
/// 2. drop a leading level-1 heading line;
/// 3. drop leaked scalar metadata lines and malformed image lines;
/// 4. collapse runs of three or more blank lines to one and trim.
///
/// Every pass either leaves the text untouched or makes it strictly shorter,
/// so the loop terminates and the result is a fixed point:
/// `sanitize(&sanitize(s)) == sanitize(s)`.
#[must_use]
pub fn sanitize(raw_body: &str) -> String {
    let mut current = sanitize_once(raw_body);
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_once(input: &str) -> String {
    let unwrapped = unwrap_structured_output(input);
    let body = unwrapped.as_deref().unwrap_or(input);
    let body = strip_leading_title(body);

    let filtered = body
        .split('\n')
        .filter(|line| keep_line(line))
        .collect::<Vec<_>>()
        .join("\n");

    EXCESS_BLANK_LINES
        .replace_all(&filtered, "\n\n")
        .trim()
        .to_string()
}

/// Remove a Markdown code fence wrapping the whole text.
///
/// Returns `None` when the text does not start with a fence. The opening
/// fence line (with any language tag) and a trailing closing fence are
/// dropped; a missing closing fence is tolerated.
#[must_use]
pub fn strip_code_fence(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix("```")?;

    let rest = match rest.find('\n') {
        Some(idx)
            if rest[..idx]
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            &rest[idx + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    let rest = rest.trim_end();
    Some(rest.strip_suffix("```").unwrap_or(rest).trim())
}

/// Extract the `content` string from a leaked JSON envelope.
///
/// Returns `None` unless the text looks like a (possibly fenced) JSON object
/// carrying a non-blank `content` string, and that object is the whole text:
/// either it closes at the end of the input or it is cut off before closing.
/// A fenced JSON example followed by prose is an article, not an envelope.
fn unwrap_structured_output(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.starts_with("```") && !trimmed.starts_with('{') {
        return None;
    }

    let inner = strip_code_fence(trimmed).unwrap_or(trimmed);
    if !inner.starts_with('{') || !inner.contains("\"content\"") {
        return None;
    }

    let content = match serde_json::from_str::<serde_json::Value>(inner) {
        Ok(value) => value.get("content")?.as_str().map(str::to_owned)?,
        Err(_) => {
            let (content, rest) = scan_string_field(inner, "content")?;
            if !object_ends_at_text_end(rest) {
                return None;
            }
            content
        }
    };

    if content.trim().is_empty() {
        None
    } else {
        Some(content)
    }
}

/// Whether the enclosing object, resumed just after a string value, either
/// closes with nothing but whitespace after it or never closes at all.
fn object_ends_at_text_end(rest: &str) -> bool {
    let mut depth = 1_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in rest.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return rest[idx + c.len_utf8()..].trim().is_empty();
                }
            }
            _ => {}
        }
    }

    true
}

/// Scan a JSON-ish fragment for `"<field>": "<value>"` and unescape the value.
///
/// Works on truncated input: if the closing quote never arrives, everything up
/// to the end of the text (minus stray closing braces or fence backticks) is
/// taken as the value.
#[must_use]
pub fn extract_string_field(text: &str, field: &str) -> Option<String> {
    scan_string_field(text, field).map(|(value, _)| value)
}

/// Like [`extract_string_field`], also returning the text after the value's
/// closing quote (empty when the value is truncated).
fn scan_string_field<'a>(text: &'a str, field: &str) -> Option<(String, &'a str)> {
    let key = format!("\"{field}\"");
    let after_key = &text[text.find(&key)? + key.len()..];
    let value = after_key
        .trim_start()
        .strip_prefix(':')?
        .trim_start()
        .strip_prefix('"')?;

    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((out, &value[idx + 1..])),
            '\\' => match chars.next().map(|(_, c)| c) {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('/') => out.push('/'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                    if let Some(ch) = u32::from_str_radix(&hex, 16)
                        .ok()
                        .and_then(char::from_u32)
                    {
                        out.push(ch);
                    }
                }
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            _ => out.push(c),
        }
    }

    let truncated = out.trim_end().trim_end_matches(['}', '`']).trim_end();
    Some((truncated.to_string(), ""))
}

fn strip_leading_title(body: &str) -> &str {
    let body = body.trim_start();
    let (first_line, rest) = body.split_once('\n').unwrap_or((body, ""));
    let first_line = first_line.trim_end();

    if first_line == "#" || first_line.starts_with("# ") {
        rest
    } else {
        body
    }
}

fn keep_line(line: &str) -> bool {
    if METADATA_LINE.is_match(line) {
        return false;
    }

    let trimmed = line.trim_start();
    !(trimmed.starts_with('!') && !trimmed.starts_with("!["))
}

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;
