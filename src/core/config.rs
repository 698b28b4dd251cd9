//! Build configuration from YAML

use crate::core::context::DEFAULT_BANNER;
use crate::core::graph::TaskGraph;
use crate::core::step::Step;
use crate::tools::ToolsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Project name (used for display only; artifact names come from `package.json`)
    pub name: String,

    /// Path of `package.json`, relative to the project root
    #[serde(default = "default_package")]
    pub package: String,

    /// Banner template prefixed to bundled artifacts
    #[serde(default = "default_banner")]
    pub banner: String,

    /// Leaf steps
    #[serde(default)]
    pub targets: Vec<Step>,

    /// Composite tasks
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,

    /// Watch bindings
    #[serde(default)]
    pub watch: Vec<WatchConfig>,

    /// Site buckets; each becomes an `s3:<fqdn>` upload target
    #[serde(default)]
    pub sites: Vec<String>,

    /// External tool overrides
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// A named, ordered list of task or target references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub name: String,
    pub run: Vec<String>,
}

impl TaskConfig {
    pub fn new(name: &str, run: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            run: run.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Re-run `tasks` whenever a file matching `files` changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub name: String,
    pub files: Vec<String>,
    pub tasks: Vec<String>,
}

fn default_package() -> String {
    "package.json".to_string()
}

fn default_banner() -> String {
    DEFAULT_BANNER.to_string()
}

impl BuildConfig {
    /// Load a build configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a build configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: BuildConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate names, references and cycles
    pub fn validate(&self) -> Result<()> {
        TaskGraph::from_config(self)?;
        Ok(())
    }

    /// Convert config to the task graph
    pub fn to_graph(&self) -> Result<TaskGraph> {
        Ok(TaskGraph::from_config(self)?)
    }
}
