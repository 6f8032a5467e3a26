/// Derive a URL- and path-safe slug from a title.
///
/// Lower-cases the input, replaces every run of characters outside
/// `[a-z0-9]` with a single `-`, and trims hyphens from both ends. Non-ASCII
/// letters count as separators. Returns an empty string when the title has
/// no ASCII alphanumerics at all.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
