//! File helpers that report the path on failure

use crate::core::StepError;
use std::fs;
use std::path::Path;

pub fn read_text(path: &Path) -> Result<String, StepError> {
    fs::read_to_string(path).map_err(|e| StepError::io(path, e))
}

/// Write a file, creating parent directories as needed
pub fn write_text(path: &Path, content: &str) -> Result<(), StepError> {
    ensure_parent(path)?;
    fs::write(path, content).map_err(|e| StepError::io(path, e))
}

/// Copy a file byte for byte, creating parent directories as needed
pub fn copy_file(from: &Path, to: &Path) -> Result<(), StepError> {
    ensure_parent(to)?;
    fs::copy(from, to).map_err(|e| StepError::io(from, e))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), StepError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StepError::io(parent, e))
        }
        _ => Ok(()),
    }
}
