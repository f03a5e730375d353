//! HTML text helpers

/// Remove HTML tags, keeping text content
pub fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate to `length` characters, appending `omission` when cut
pub fn truncate_chars(s: &str, length: usize, omission: &str) -> String {
    if s.chars().count() <= length {
        return s.to_string();
    }
    let truncated: String = s.chars().take(length).collect();
    format!("{}{}", truncated.trim_end(), omission)
}
