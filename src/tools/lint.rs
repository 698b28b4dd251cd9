//! Built-in syntax lint for scripts
//!
//! Parses each script as an ECMAScript program and reports every parse
//! error, plus leftover merge conflict markers. Style rules are left to an
//! external linter.

use crate::core::Diagnostic;
use crate::tools::{jslex, ToolError};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;
use std::path::{Path, PathBuf};

const CONFLICT_PREFIXES: [&str; 3] = ["<<<<<<< ", "=======", ">>>>>>> "];

// jshint's default reporter: `file: line 3, col 7, message`
const REPORT_LINE: &str = r"^(.+?): line (\d+), col (\d+), (.+)$";

/// Turn an external linter's report into diagnostics
///
/// Lines in the jshint reporter format become one diagnostic each. Any
/// other report becomes a single diagnostic against the directory holding
/// the linted files.
pub fn parse_report(files: &[PathBuf], report: &str) -> Result<Vec<Diagnostic>, ToolError> {
    let pattern = Regex::new(REPORT_LINE).map_err(|e| ToolError::Internal(e.to_string()))?;

    let diagnostics: Vec<_> = report
        .lines()
        .filter_map(|line| pattern.captures(line.trim()))
        .map(|captures| Diagnostic {
            file: PathBuf::from(&captures[1]),
            line: captures[2].parse().unwrap_or(0),
            column: captures[3].parse().unwrap_or(0),
            message: captures[4].to_string(),
        })
        .collect();
    if !diagnostics.is_empty() {
        return Ok(diagnostics);
    }

    let message = if report.trim().is_empty() {
        "Linter reported problems without output".to_string()
    } else {
        report.trim().to_string()
    };
    Ok(vec![Diagnostic {
        file: common_dir(files),
        line: 0,
        column: 0,
        message,
    }])
}

fn common_dir(files: &[PathBuf]) -> PathBuf {
    let mut dirs = files.iter().filter_map(|f| f.parent());
    let Some(first) = dirs.next() else {
        return PathBuf::from(".");
    };
    dirs.fold(first.to_path_buf(), |common, dir| {
        common
            .ancestors()
            .find(|a| dir.starts_with(a))
            .map(Path::to_path_buf)
            .unwrap_or_default()
    })
}

/// Check one script and return its problems
pub fn check(file: &Path, source: &str) -> Vec<Diagnostic> {
    let diagnostic = |offset: usize, message: String| {
        let (line, column) = jslex::position(source, offset);
        Diagnostic {
            file: file.to_path_buf(),
            line,
            column,
            message,
        }
    };

    let mut diagnostics = Vec::new();

    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if CONFLICT_PREFIXES
            .iter()
            .any(|p| trimmed == p.trim_end() || trimmed.starts_with(p))
        {
            diagnostics.push(diagnostic(offset, "Merge conflict marker".to_string()));
        }
        offset += line.len();
    }
    if !diagnostics.is_empty() {
        return diagnostics;
    }

    // Sources are classic scripts concatenated into one bundle, not modules
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(false);
    let parsed = Parser::new(&allocator, source, source_type).parse();

    for error in &parsed.errors {
        let at = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map(|label| label.offset())
            .unwrap_or(0);
        diagnostics.push(diagnostic(at, error.message.to_string()));
    }

    diagnostics
}
