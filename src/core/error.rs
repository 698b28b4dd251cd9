//! Error types for configuration loading and step execution

use crate::tools::ToolError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Problems found while loading or validating a build configuration.
///
/// These abort a run before any step executes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Duplicate task or target name: {0}")]
    DuplicateName(String),

    #[error("'{from}' references unknown task or target '{reference}'")]
    UnknownReference { from: String, reference: String },

    #[error("Unknown task '{0}'")]
    UnknownTask(String),

    #[error("Cycle detected in task graph involving '{0}'")]
    Cycle(String),

    #[error("Unknown placeholder '{{{{ {placeholder} }}}}' in '{template}'")]
    UnknownPlaceholder { placeholder: String, template: String },

    #[error("Failed to read package metadata from {}: {message}", .path.display())]
    Package { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A single lint finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// Failure of a single step. Any of these halts the rest of the run.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("No files matched {patterns:?}")]
    NoSources { patterns: Vec<String> },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Lint failed with {} problem(s):\n{}", .0.len(), format_diagnostics(.0))]
    Lint(Vec<Diagnostic>),

    #[error("{}: {message}", .path.display())]
    Transform { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StepError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StepError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn transform(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StepError::Transform {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  {}", d))
        .collect::<Vec<_>>()
        .join("\n")
}
