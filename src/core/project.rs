//! Project - a root directory plus the task graph that builds it

use crate::core::{
    config::BuildConfig, defaults, BuildContext, ConfigError, PackageInfo, Pipeline, TaskGraph,
};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// A loaded, validated project
#[derive(Debug, Clone)]
pub struct Project {
    /// Project directory all step paths are relative to
    pub root: PathBuf,

    /// Configuration the graph was built from
    pub config: BuildConfig,

    /// Validated task graph
    pub graph: TaskGraph,

    /// YAML file the configuration came from, if not built in
    pub config_file: Option<PathBuf>,
}

impl Project {
    /// Load the graph from `file`, or use the built-in pushit graph
    pub fn load(root: &Path, file: Option<&Path>) -> Result<Self> {
        let config = match file {
            Some(file) => BuildConfig::from_file(file)
                .with_context(|| format!("Failed to load build configuration {}", file.display()))?,
            None => defaults::pushit(),
        };
        Self::from_config(root, config, file.map(Path::to_path_buf))
    }

    pub fn from_config(root: &Path, config: BuildConfig, config_file: Option<PathBuf>) -> Result<Self> {
        let graph = config.to_graph().context("Invalid task graph")?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            graph,
            config_file,
        })
    }

    /// Read `package.json` and build the template context for one run
    pub fn context(&self, built_at: NaiveDateTime) -> Result<BuildContext, ConfigError> {
        let package = PackageInfo::from_file(self.root.join(&self.graph.package))?;
        BuildContext::with_banner(package, built_at, &self.graph.banner)
    }

    /// Resolve a task, target or target family into a fresh pipeline
    pub fn pipeline(&self, task: &str) -> Result<Pipeline, ConfigError> {
        Pipeline::from_graph(&self.graph, task)
    }

    /// Resolve the tasks bound to watch target `name` into a fresh pipeline
    pub fn watch_pipeline(&self, name: &str) -> Result<Pipeline, ConfigError> {
        let watch = self
            .graph
            .watch(name)
            .ok_or_else(|| ConfigError::UnknownTask(name.to_string()))?;
        let steps = self.graph.resolve_all(&watch.tasks)?;
        Ok(Pipeline::from_steps(
            &format!("watch:{}", watch.name),
            steps.into_iter().cloned().collect(),
        ))
    }

    /// Globs watched for target `name`, relative to the root.
    ///
    /// A configuration file inside the project is watched as well.
    pub fn watch_files(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        let watch = self
            .graph
            .watch(name)
            .ok_or_else(|| ConfigError::UnknownTask(name.to_string()))?;
        let mut files = watch.files.clone();

        if let Some(config_file) = &self.config_file {
            let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
            let config_file = config_file
                .canonicalize()
                .unwrap_or_else(|_| config_file.clone());
            if let Ok(relative) = config_file.strip_prefix(&root) {
                let relative = relative.to_string_lossy().replace('\\', "/");
                if !files.contains(&relative) {
                    files.push(relative);
                }
            }
        }

        Ok(files)
    }
}
