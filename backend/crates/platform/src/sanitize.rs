//! Free-text sanitizing
//!
//! Trims surrounding whitespace and HTML-escapes the five characters that
//! matter in markup. Applied to user-supplied text fields before they are
//! validated or stored. Never applied to passwords.

/// Trim, then escape `& < > ' "`
///
/// ```rust
/// use platform::sanitize::sanitize;
///
/// assert_eq!(sanitize("  <b>bob</b> "), "&lt;b&gt;bob&lt;/b&gt;");
/// ```
pub fn sanitize(input: &str) -> String {
    let trimmed = input.trim();
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            other => out.push(other),
        }
    }
    out
}
