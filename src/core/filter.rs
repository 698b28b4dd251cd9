//! Source path guards

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Substrings left behind by merge tools next to conflicted files
/// (`app.js.BASE`, `app_BACKUP_1234.js`, ...).
pub const CONFLICT_MARKERS: [&str; 4] = ["BACKUP", "LOCAL", "BASE", "REMOTE"];

/// A predicate applied to a step's source list before the step reads it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathFilter {
    /// Reject version-control conflict leftovers
    NotGitFile,
}

impl PathFilter {
    /// Check whether a source path passes the filter
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            PathFilter::NotGitFile => not_git_file(&path.to_string_lossy()),
        }
    }
}

/// Returns false when `path` contains any conflict marker, true otherwise
pub fn not_git_file(path: &str) -> bool {
    !CONFLICT_MARKERS.iter().any(|marker| path.contains(marker))
}
