//! File copy rules

use crate::core::{step::CopyRule, StepError};
use crate::tools::{files, sources};
use std::path::{Path, PathBuf};

/// Where each matched source of `rule` goes, as `(from, to)` pairs
pub fn plan(root: &Path, rule: &CopyRule) -> Result<Vec<(PathBuf, PathBuf)>, StepError> {
    let matched = sources::resolve(root, &rule.src, rule.cwd.as_deref(), rule.filter)?;
    let dest = root.join(&rule.dest);
    let into_dir = rule.expand || rule.dest.ends_with('/');

    Ok(matched
        .into_iter()
        .map(|source| {
            let to = if !into_dir {
                dest.clone()
            } else if rule.flatten {
                let name = source
                    .relative
                    .rsplit('/')
                    .next()
                    .unwrap_or(&source.relative)
                    .to_string();
                dest.join(name)
            } else {
                dest.join(&source.relative)
            };
            (source.path, to)
        })
        .collect())
}

/// Copy every match of `rule` and return the written paths
pub fn apply(root: &Path, rule: &CopyRule) -> Result<Vec<PathBuf>, StepError> {
    let mut written = Vec::new();
    for (from, to) in plan(root, rule)? {
        files::copy_file(&from, &to)?;
        if !written.contains(&to) {
            written.push(to);
        }
    }
    Ok(written)
}
