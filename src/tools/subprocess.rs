//! External command runner - runs configured tool commands through `sh -c`

use crate::tools::ToolError;
use regex::{Captures, Regex};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs command templates with placeholder substitution
#[derive(Debug, Clone)]
pub struct CommandRunner {
    /// Timeout for each command in seconds
    timeout_secs: u64,
}

impl CommandRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    /// Substitute `{key}` placeholders with shell-quoted values in one pass.
    /// Unknown keys are left as they are.
    pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String, ToolError> {
        let placeholder =
            Regex::new(r"\{([a-z_]+)\}").map_err(|e| ToolError::Internal(e.to_string()))?;
        let rendered = placeholder.replace_all(template, |captures: &Captures| {
            match vars.iter().find(|(key, _)| *key == &captures[1]) {
                Some((_, value)) => shell_quote(value),
                None => captures[0].to_string(),
            }
        });
        Ok(rendered.into_owned())
    }

    /// Run a command template and return its stdout
    ///
    /// # Errors
    /// Returns `ToolError` if:
    /// - `sh` cannot be spawned
    /// - the command exits with a non-zero status
    /// - the output is not valid UTF-8
    /// - the command times out
    pub async fn run(&self, template: &str, vars: &[(&str, &str)]) -> Result<String, ToolError> {
        let command = Self::render(template, vars)?;
        debug!("Running tool command: {}", command);

        let result = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new("sh")
                .arg("-c")
                .arg(&command)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ToolError::Timeout {
            command: command.clone(),
            secs: self.timeout_secs,
        })?;

        let output = result.map_err(|e| ToolError::Spawn {
            command: command.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", command, code, stderr);
            return Err(ToolError::Failed {
                command,
                code,
                stdout,
                stderr,
            });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ToolError::Internal(format!("Failed to decode output of {}: {}", command, e)))?;

        debug!("{} returned {} bytes", command, stdout.len());
        Ok(stdout)
    }
}

/// Quote a value for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
