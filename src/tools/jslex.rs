//! Lexical scanner for JavaScript sources
//!
//! Splits a script into code, string, template, comment and regular
//! expression segments. It does not tokenize code; the linter and the
//! minifier only need to know which bytes are literal text.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    Str,
    Template,
    LineComment,
    BlockComment,
    Regex,
}

impl SegmentKind {
    pub fn is_comment(self) -> bool {
        matches!(self, SegmentKind::LineComment | SegmentKind::BlockComment)
    }
}

/// A contiguous slice of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset into the source
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unterminated {what} starting at {line}:{column}")]
pub struct ScanError {
    pub what: &'static str,
    pub line: usize,
    pub column: usize,
}

// Keywords after which `/` starts a regular expression
const REGEX_KEYWORDS: [&str; 10] = [
    "return", "typeof", "case", "do", "else", "in", "of", "void", "delete", "throw",
];

/// 1-based line and column of a byte offset
pub fn position(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn unterminated(source: &str, offset: usize, what: &'static str) -> ScanError {
    let (line, column) = position(source, offset);
    ScanError { what, line, column }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn regex_allowed(code_before: &str, carried: Option<u8>) -> bool {
    let trimmed = code_before.trim_end();
    let last = trimmed.as_bytes().last().copied().or(carried);
    match last {
        None => true,
        Some(b) if is_ident(b) => {
            if trimmed.is_empty() {
                return false;
            }
            let word_start = trimmed
                .bytes()
                .rposition(|c| !is_ident(c))
                .map(|p| p + 1)
                .unwrap_or(0);
            // `range.in / 2` divides a property
            if trimmed[..word_start].trim_end().ends_with('.') {
                return false;
            }
            REGEX_KEYWORDS.contains(&&trimmed[word_start..])
        }
        Some(b')') | Some(b']') | Some(b'}') | Some(b'"') | Some(b'\'') | Some(b'`') => false,
        Some(_) => true,
    }
}

/// Split `source` into segments covering every byte in order
pub fn scan(source: &str) -> Result<Vec<Segment<'_>>, ScanError> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut code_start = 0;
    // Last significant byte before the current code run; literals count as `"`
    let mut carried: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        let (kind, end) = match bytes[i] {
            b'/' if next == Some(b'/') => {
                let end = source[i..].find('\n').map(|p| i + p).unwrap_or(bytes.len());
                (SegmentKind::LineComment, end)
            }
            b'/' if next == Some(b'*') => {
                let end = source[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .ok_or_else(|| unterminated(source, i, "comment"))?;
                (SegmentKind::BlockComment, end)
            }
            quote @ (b'\'' | b'"') => (SegmentKind::Str, scan_string(source, i, quote)?),
            b'`' => (SegmentKind::Template, scan_template(source, i)?),
            b'/' if regex_allowed(&source[code_start..i], carried) => {
                (SegmentKind::Regex, scan_regex(source, i)?)
            }
            _ => {
                i += 1;
                continue;
            }
        };

        if code_start < i {
            let code = &source[code_start..i];
            if let Some(b) = code.trim_end().as_bytes().last() {
                carried = Some(*b);
            }
            segments.push(Segment {
                kind: SegmentKind::Code,
                text: code,
                offset: code_start,
            });
        }
        segments.push(Segment {
            kind,
            text: &source[i..end],
            offset: i,
        });
        if !kind.is_comment() {
            carried = Some(b'"');
        }

        i = end;
        code_start = end;
    }

    if code_start < bytes.len() {
        segments.push(Segment {
            kind: SegmentKind::Code,
            text: &source[code_start..],
            offset: code_start,
        });
    }

    Ok(segments)
}

fn scan_string(source: &str, start: usize, quote: u8) -> Result<usize, ScanError> {
    let bytes = source.as_bytes();
    let mut j = start + 1;
    loop {
        match bytes.get(j) {
            None | Some(b'\n') => return Err(unterminated(source, start, "string")),
            Some(b'\\') => j += 2,
            Some(b) if *b == quote => return Ok(j + 1),
            Some(_) => j += 1,
        }
    }
}

fn scan_template(source: &str, start: usize) -> Result<usize, ScanError> {
    let bytes = source.as_bytes();
    let mut j = start + 1;
    let mut depth = 0usize;
    loop {
        match bytes.get(j) {
            None => return Err(unterminated(source, start, "template literal")),
            Some(b'\\') => j += 2,
            Some(b'`') if depth == 0 => return Ok(j + 1),
            Some(b'$') if bytes.get(j + 1) == Some(&b'{') => {
                depth += 1;
                j += 2;
            }
            Some(b'{') if depth > 0 => {
                depth += 1;
                j += 1;
            }
            Some(b'}') if depth > 0 => {
                depth -= 1;
                j += 1;
            }
            Some(_) => j += 1,
        }
    }
}

fn scan_regex(source: &str, start: usize) -> Result<usize, ScanError> {
    let bytes = source.as_bytes();
    let mut j = start + 1;
    let mut in_class = false;
    loop {
        match bytes.get(j) {
            None | Some(b'\n') => {
                return Err(unterminated(source, start, "regular expression"))
            }
            Some(b'\\') => j += 2,
            Some(b'[') => {
                in_class = true;
                j += 1;
            }
            Some(b']') => {
                in_class = false;
                j += 1;
            }
            Some(b'/') if !in_class => {
                j += 1;
                while bytes.get(j).copied().is_some_and(is_ident) {
                    j += 1;
                }
                return Ok(j);
            }
            Some(_) => j += 1,
        }
    }
}
