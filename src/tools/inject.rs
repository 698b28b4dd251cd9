//! Script reference injection into HTML pages

/// Placeholder line replaced by the script tags
pub const MARKER: &str = "<!-- inject:js -->";

/// Replace the marker line in `page` with one `<script>` tag per source.
///
/// With `scripts == None` the marker line is removed and a page without the
/// marker passes through. With a script list the marker must be present.
pub fn inject(page: &str, scripts: Option<&[String]>) -> Result<String, String> {
    if scripts.is_some() && !page.contains(MARKER) {
        return Err(format!("Marker '{}' not found", MARKER));
    }

    let mut out = String::with_capacity(page.len());
    for line in page.split_inclusive('\n') {
        if !line.contains(MARKER) {
            out.push_str(line);
            continue;
        }

        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        let ending = if line.ends_with("\r\n") {
            "\r\n"
        } else if line.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        let tags = scripts.unwrap_or_default();
        for (i, src) in tags.iter().enumerate() {
            out.push_str(&indent);
            out.push_str(&format!("<script src=\"{}\"></script>", src));
            // Keep the page's own ending after the last tag
            out.push_str(if i + 1 == tags.len() { ending } else { "\n" });
        }
    }

    Ok(out)
}
