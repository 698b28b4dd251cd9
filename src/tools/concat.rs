//! File concatenation

/// Drop a leading `/* ... */` block comment. `/*!` comments are kept.
pub fn strip_banner(content: &str) -> &str {
    let trimmed = content.trim_start();
    if !trimmed.starts_with("/*") || trimmed.starts_with("/*!") {
        return content;
    }
    match trimmed[2..].find("*/") {
        Some(end) => trimmed[2 + end + 2..].trim_start(),
        None => content,
    }
}

/// `banner` followed by `parts` joined with `separator`
pub fn join<S: AsRef<str>>(banner: &str, parts: &[S], separator: &str) -> String {
    let mut out = String::from(banner);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(part.as_ref());
    }
    out
}
