//! Output directory removal

use crate::core::StepError;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Remove `paths` (relative to `root`) when present and return the removed ones.
///
/// Absolute paths and paths leaving the project are refused.
pub fn remove(root: &Path, paths: &[String]) -> Result<Vec<PathBuf>, StepError> {
    let mut removed = Vec::new();

    for path in paths {
        let relative = Path::new(path);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(StepError::transform(
                relative,
                "refusing to clean a path outside the project",
            ));
        }

        let target = root.join(relative);
        if target.is_dir() {
            std::fs::remove_dir_all(&target).map_err(|e| StepError::io(&target, e))?;
        } else if target.exists() {
            std::fs::remove_file(&target).map_err(|e| StepError::io(&target, e))?;
        } else {
            continue;
        }
        debug!("Removed {}", target.display());
        removed.push(target);
    }

    Ok(removed)
}
