//! Source glob resolution
//!
//! Patterns are applied in order: plain patterns add matching files, patterns
//! prefixed with `!` remove files already collected. Only regular files are
//! returned, each once; matches of one pattern come out sorted.

use crate::core::{PathFilter, StepError};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A matched source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path on disk
    pub path: PathBuf,

    /// Path relative to the project root, `/`-separated
    pub root_relative: String,

    /// Path relative to the step's `cwd` (the root when unset)
    pub relative: String,
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

fn invalid(pattern: &str, error: impl ToString) -> StepError {
    StepError::InvalidPattern {
        pattern: pattern.to_string(),
        message: error.to_string(),
    }
}

/// `path` relative to `base` with `/` separators
pub fn relative_string(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand `patterns` below `root/cwd`, apply `filter` and require a match
pub fn resolve(
    root: &Path,
    patterns: &[String],
    cwd: Option<&str>,
    filter: Option<PathFilter>,
) -> Result<Vec<SourceFile>, StepError> {
    let files = collect(root, patterns, cwd, filter)?;
    if files.is_empty() {
        return Err(StepError::NoSources {
            patterns: patterns.to_vec(),
        });
    }
    Ok(files)
}

/// Like [`resolve`], but an empty result is not an error
pub fn collect(
    root: &Path,
    patterns: &[String],
    cwd: Option<&str>,
    filter: Option<PathFilter>,
) -> Result<Vec<SourceFile>, StepError> {
    let base = match cwd {
        Some(cwd) => root.join(cwd),
        None => root.to_path_buf(),
    };
    let escaped_base = Pattern::escape(&base.to_string_lossy());
    let escaped_base = escaped_base.trim_end_matches('/');

    let mut files: Vec<SourceFile> = Vec::new();

    for pattern in patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            let matcher = Pattern::new(negated).map_err(|e| invalid(pattern, e))?;
            files.retain(|f| !matcher.matches_with(&f.relative, match_options()));
            continue;
        }

        let full = format!("{}/{}", escaped_base, pattern);
        let mut matches = glob::glob_with(&full, match_options())
            .map_err(|e| invalid(pattern, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                let path = e.path().to_path_buf();
                StepError::io(path, e.into_error())
            })?;
        matches.sort();

        for path in matches {
            if !path.is_file() {
                continue;
            }

            let relative = relative_string(&path, &base);
            if files.iter().any(|f| f.relative == relative) {
                continue;
            }
            let root_relative = relative_string(&path, root);
            files.push(SourceFile {
                path,
                root_relative,
                relative,
            });
        }
    }

    if let Some(filter) = filter {
        let before = files.len();
        files.retain(|f| filter.accepts(Path::new(&f.root_relative)));
        if files.len() != before {
            debug!("Filter {:?} dropped {} file(s)", filter, before - files.len());
        }
    }

    Ok(files)
}
