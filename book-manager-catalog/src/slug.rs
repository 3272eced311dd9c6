//! URL-safe slugs for book titles.

/// Convert a string to a URL-safe slug.
///
/// Lowercase ASCII alphanumerics separated by single hyphens. Titles with no
/// ASCII alphanumerics at all fall back to `"book"` so a slug is never empty.
///
/// ```
/// use book_manager_catalog::slugify;
///
/// assert_eq!(slugify("The Left Hand of Darkness"), "the-left-hand-of-darkness");
/// assert_eq!(slugify("Dune: Messiah!"), "dune-messiah");
/// ```
pub fn slugify(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_separator = false;

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_separator = false;
        } else if !last_was_separator && !result.is_empty() {
            result.push('-');
            last_was_separator = true;
        }
    }

    // Trim trailing separator
    if result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        result.push_str("book");
    }

    result
}

/// The `n`th candidate slug for `base`: `base`, `base-2`, `base-3`, ...
pub fn numbered_slug(base: &str, n: u32) -> String {
    if n <= 1 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}
