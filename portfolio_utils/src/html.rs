//! Helpers for embedding untrusted text into HTML documents.

/// Replaces `&`, `<`, `>`, `"` and `'` with their HTML entities.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Replaces every line feed with a `<br>` tag.
pub fn line_breaks_to_br(text: &str) -> String {
    text.replace('\n', "<br>")
}
