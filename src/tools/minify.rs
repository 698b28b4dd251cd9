//! Built-in minifiers
//!
//! Both minifiers only drop comments and redundant whitespace. Tokens are
//! never renamed or reordered.

use crate::tools::jslex::{self, ScanError, SegmentKind};

// Whitespace next to these never separates two tokens
const SCRIPT_TIGHT: &str = "{}()[];,:=<>!&|?*%~^";
// A line break after these (or before the second set) cannot end a statement
const NEWLINE_AFTER: &str = "{(;,[";
const NEWLINE_BEFORE: &str = "}),;]";

const STYLE_TIGHT: &str = "{};,>";

#[derive(Default)]
struct Pending {
    space: bool,
    newline: bool,
}

impl Pending {
    fn add(&mut self, newline: bool) {
        self.space = true;
        self.newline |= newline;
    }

    fn flush(&mut self, out: &mut String, next: char) {
        if !self.space {
            return;
        }
        if let Some(prev) = out.chars().last() {
            if self.newline {
                if !NEWLINE_AFTER.contains(prev) && !NEWLINE_BEFORE.contains(next) {
                    out.push('\n');
                }
            } else if !SCRIPT_TIGHT.contains(prev) && !SCRIPT_TIGHT.contains(next) {
                out.push(' ');
            }
        }
        *self = Pending::default();
    }
}

/// Minify a script
pub fn minify_script(source: &str) -> Result<String, ScanError> {
    let mut out = String::with_capacity(source.len());
    let mut pending = Pending::default();

    for segment in jslex::scan(source)? {
        match segment.kind {
            SegmentKind::LineComment => {}
            SegmentKind::BlockComment => pending.add(segment.text.contains('\n')),
            SegmentKind::Code => {
                for c in segment.text.chars() {
                    if c.is_whitespace() {
                        pending.add(c == '\n');
                    } else {
                        pending.flush(&mut out, c);
                        out.push(c);
                    }
                }
            }
            SegmentKind::Str | SegmentKind::Template | SegmentKind::Regex => {
                if let Some(first) = segment.text.chars().next() {
                    pending.flush(&mut out, first);
                }
                out.push_str(segment.text);
            }
        }
    }

    Ok(out)
}

fn strip_style_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => {
                out.push(' ');
                rest = &rest[start + 2 + end + 2..];
            }
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Minify a style sheet
pub fn minify_style(source: &str) -> String {
    let stripped = strip_style_comments(source);
    let mut out = String::with_capacity(stripped.len());
    let mut space = false;

    for c in stripped.chars() {
        if c.is_whitespace() {
            space = true;
            continue;
        }
        if space {
            let prev_tight = out.chars().last().map(|p| STYLE_TIGHT.contains(p));
            if prev_tight == Some(false) && !STYLE_TIGHT.contains(c) {
                out.push(' ');
            }
            space = false;
        }
        if c == '}' && out.ends_with(';') {
            out.pop();
        }
        out.push(c);
    }

    out
}
