//! Leaf transformations
//!
//! Deterministic file transformations (templates, wrapping, concatenation,
//! copying, manifests) are built in. Steps that traditionally belong to
//! external tools (style compiler, linter, minifiers, notifications, upload)
//! go through the [`Toolchain`] trait, so a project can route them to real
//! commands while tests substitute a mock.

pub mod clean;
pub mod concat;
pub mod copy;
pub mod files;
pub mod inject;
pub mod jslex;
pub mod lint;
pub mod manifest;
pub mod minify;
pub mod replace;
pub mod sources;
pub mod styles;
pub mod subprocess;
pub mod templates;
pub mod upload;
pub mod wrap;

use crate::core::{error::Diagnostic, step::Language};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use subprocess::CommandRunner;
use thiserror::Error;
use tracing::{debug, info};

/// Error types for tool invocations
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{command} exited with code {code}: {}", failure_output(.stdout, .stderr))]
    Failed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("{command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("Failed to spawn {command}: {message}")]
    Spawn { command: String, message: String },

    #[error("No {0} command configured")]
    NotConfigured(&'static str),

    #[error("Failed to read {}: {message}", .path.display())]
    Input { path: PathBuf, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

fn failure_output<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    if stderr.is_empty() {
        stdout
    } else {
        stderr
    }
}

/// External command templates, keyed by the step they replace.
///
/// Templates are run through `sh -c`. Placeholders in braces are replaced by
/// shell-quoted values: `{input}` (style compile, minify), `{files}` (lint),
/// `{message}` (notify), `{file}`, `{bucket}`, `{dest}`, `{access}` (upload).
/// Compilers and minifiers write their result to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Timeout per command in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub less: Option<String>,

    #[serde(default)]
    pub lint: Option<String>,

    #[serde(default)]
    pub uglify: Option<String>,

    #[serde(default)]
    pub mincss: Option<String>,

    #[serde(default)]
    pub notify: Option<String>,

    #[serde(default)]
    pub upload: Option<String>,
}

fn default_timeout_secs() -> u64 {
    600
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            less: None,
            lint: None,
            uglify: None,
            mincss: None,
            notify: None,
            upload: None,
        }
    }
}

/// One file to push to a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Local file
    pub file: PathBuf,
    /// Bucket name
    pub bucket: String,
    /// Remote key, starting with `/`
    pub dest: String,
    /// Access policy, e.g. `public-read`
    pub access: String,
}

/// Trait for the tool-backed steps - allows for different implementations
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Compile one style sheet and return the CSS
    async fn compile_style(&self, input: &Path) -> Result<String, ToolError>;

    /// Lint script files; an empty list means clean
    async fn lint(&self, files: &[PathBuf]) -> Result<Vec<Diagnostic>, ToolError>;

    /// Minify one file and return the result
    async fn minify(&self, language: Language, input: &Path) -> Result<String, ToolError>;

    /// Announce a message to the user
    async fn notify(&self, message: &str) -> Result<(), ToolError>;

    /// Upload one file
    async fn upload(&self, request: &UploadRequest) -> Result<(), ToolError>;
}

/// Toolchain that runs configured commands and falls back to the built-in
/// transformers when a command is not configured.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    config: ToolsConfig,
    runner: CommandRunner,
}

impl SystemToolchain {
    pub fn new(config: ToolsConfig) -> Self {
        let runner = CommandRunner::new(config.timeout_secs);
        Self { config, runner }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self::new(ToolsConfig::default())
    }
}

#[async_trait]
impl Toolchain for SystemToolchain {
    async fn compile_style(&self, input: &Path) -> Result<String, ToolError> {
        match &self.config.less {
            Some(command) => {
                let input = input.display().to_string();
                self.runner.run(command, &[("input", input.as_str())]).await
            }
            None => {
                let source = read_input(input)?;
                styles::compile(&source).map_err(|message| ToolError::Input {
                    path: input.to_path_buf(),
                    message,
                })
            }
        }
    }

    async fn lint(&self, files: &[PathBuf]) -> Result<Vec<Diagnostic>, ToolError> {
        match &self.config.lint {
            Some(command) => {
                let joined = files
                    .iter()
                    .map(|f| subprocess::shell_quote(&f.display().to_string()))
                    .collect::<Vec<_>>()
                    .join(" ");
                // `{files}` is a pre-quoted list, so it bypasses per-value quoting
                let command = command.replace("{files}", &joined);
                match self.runner.run(&command, &[]).await {
                    Ok(_) => Ok(Vec::new()),
                    // Linters report findings on stdout
                    Err(ToolError::Failed { stdout, stderr, .. }) => {
                        let report = if stdout.trim().is_empty() { stderr } else { stdout };
                        lint::parse_report(files, &report)
                    }
                    Err(other) => Err(other),
                }
            }
            None => {
                let mut diagnostics = Vec::new();
                for file in files {
                    let source = read_input(file)?;
                    diagnostics.extend(lint::check(file, &source));
                }
                Ok(diagnostics)
            }
        }
    }

    async fn minify(&self, language: Language, input: &Path) -> Result<String, ToolError> {
        let command = match language {
            Language::Script => &self.config.uglify,
            Language::Style => &self.config.mincss,
        };
        match command {
            Some(command) => {
                let input = input.display().to_string();
                self.runner.run(command, &[("input", input.as_str())]).await
            }
            None => {
                let source = read_input(input)?;
                match language {
                    Language::Script => {
                        minify::minify_script(&source).map_err(|e| ToolError::Input {
                            path: input.to_path_buf(),
                            message: e.to_string(),
                        })
                    }
                    Language::Style => Ok(minify::minify_style(&source)),
                }
            }
        }
    }

    async fn notify(&self, message: &str) -> Result<(), ToolError> {
        info!("{}", message);
        if let Some(command) = &self.config.notify {
            self.runner.run(command, &[("message", message)]).await?;
        }
        Ok(())
    }

    async fn upload(&self, request: &UploadRequest) -> Result<(), ToolError> {
        let command = self
            .config
            .upload
            .as_ref()
            .ok_or(ToolError::NotConfigured("upload"))?;
        let file = request.file.display().to_string();
        debug!("Uploading {} to {}{}", file, request.bucket, request.dest);
        self.runner
            .run(
                command,
                &[
                    ("file", file.as_str()),
                    ("bucket", request.bucket.as_str()),
                    ("dest", request.dest.as_str()),
                    ("access", request.access.as_str()),
                ],
            )
            .await?;
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<String, ToolError> {
    std::fs::read_to_string(path).map_err(|e| ToolError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
