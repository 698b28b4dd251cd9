//! Task graph - named tasks resolved to ordered step lists

use crate::core::{
    config::{BuildConfig, TaskConfig, WatchConfig},
    error::ConfigError,
    step::{RemoteUpload, Step, StepKind},
};
use crate::tools::ToolsConfig;
use std::collections::HashSet;

/// The validated task graph
#[derive(Debug, Clone)]
pub struct TaskGraph {
    /// Project name
    pub name: String,

    /// Path of `package.json`, relative to the project root
    pub package: String,

    /// Banner template
    pub banner: String,

    /// Leaf steps in declaration order
    targets: Vec<Step>,

    /// Composite tasks in declaration order
    tasks: Vec<TaskConfig>,

    /// Watch bindings
    watches: Vec<WatchConfig>,

    /// External tool overrides
    pub tools: ToolsConfig,
}

impl TaskGraph {
    /// Build and validate a graph from configuration
    pub fn from_config(config: &BuildConfig) -> Result<Self, ConfigError> {
        let mut targets = config.targets.clone();
        for fqdn in &config.sites {
            targets.push(Step::new(
                format!("s3:{}", fqdn),
                StepKind::RemoteUpload(RemoteUpload::site(fqdn)),
            ));
        }

        let graph = TaskGraph {
            name: config.name.clone(),
            package: config.package.clone(),
            banner: config.banner.clone(),
            targets,
            tasks: config.tasks.clone(),
            watches: config.watch.clone(),
            tools: config.tools.clone(),
        };
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Task and target names share one namespace
        let mut seen = HashSet::new();
        let names = self
            .targets
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.tasks.iter().map(|t| t.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateName(name.to_string()));
            }
        }

        let mut watch_names = HashSet::new();
        for watch in &self.watches {
            if !watch_names.insert(watch.name.as_str()) {
                return Err(ConfigError::DuplicateName(format!("watch:{}", watch.name)));
            }
        }

        // Cycles first, so reference checks below can recurse safely
        self.check_cycles()?;

        for task in &self.tasks {
            for reference in &task.run {
                if self.expand_reference(reference).is_none() {
                    return Err(ConfigError::UnknownReference {
                        from: task.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        for watch in &self.watches {
            for reference in &watch.tasks {
                if self.expand_reference(reference).is_none() {
                    return Err(ConfigError::UnknownReference {
                        from: format!("watch:{}", watch.name),
                        reference: reference.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Check for cycles among task aliases
    fn check_cycles(&self) -> Result<(), ConfigError> {
        let mut visited = HashSet::new();
        let mut recursion_stack = HashSet::new();

        for task in &self.tasks {
            if !visited.contains(task.name.as_str()) {
                self.dfs_check(&task.name, &mut visited, &mut recursion_stack)?;
            }
        }

        Ok(())
    }

    fn dfs_check<'a>(
        &'a self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        recursion_stack: &mut HashSet<&'a str>,
    ) -> Result<(), ConfigError> {
        visited.insert(name);
        recursion_stack.insert(name);

        if let Some(task) = self.task(name) {
            for reference in &task.run {
                if self.task(reference).is_none() {
                    continue;
                }
                if recursion_stack.contains(reference.as_str()) {
                    return Err(ConfigError::Cycle(reference.clone()));
                }
                if !visited.contains(reference.as_str()) {
                    self.dfs_check(reference, visited, recursion_stack)?;
                }
            }
        }

        recursion_stack.remove(name);
        Ok(())
    }

    /// Look up a composite task
    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Look up a leaf step
    pub fn target(&self, name: &str) -> Option<&Step> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Look up a watch binding by name (`dev` for `watch:dev`)
    pub fn watch(&self, name: &str) -> Option<&WatchConfig> {
        let name = name.strip_prefix("watch:").unwrap_or(name);
        self.watches.iter().find(|w| w.name == name)
    }

    pub fn tasks(&self) -> &[TaskConfig] {
        &self.tasks
    }

    pub fn targets(&self) -> &[Step] {
        &self.targets
    }

    pub fn watches(&self) -> &[WatchConfig] {
        &self.watches
    }

    /// Resolve a task, target or target family to its ordered step list.
    ///
    /// Composite tasks concatenate their references' lists in order. Nothing
    /// is deduplicated: a step referenced twice runs twice.
    pub fn resolve(&self, name: &str) -> Result<Vec<&Step>, ConfigError> {
        self.expand_reference(name)
            .ok_or_else(|| ConfigError::UnknownTask(name.to_string()))
    }

    /// Resolve several references back to back
    pub fn resolve_all(&self, names: &[String]) -> Result<Vec<&Step>, ConfigError> {
        let mut steps = Vec::new();
        for name in names {
            steps.extend(self.resolve(name)?);
        }
        Ok(steps)
    }

    /// `(task, step names)` for every task, in declaration order
    pub fn resolved_names(&self) -> Vec<(String, Vec<String>)> {
        self.tasks
            .iter()
            .map(|task| {
                let steps = self
                    .resolve(&task.name)
                    .map(|steps| steps.iter().map(|s| s.name.clone()).collect())
                    .unwrap_or_default();
                (task.name.clone(), steps)
            })
            .collect()
    }

    // Tasks win over targets; a bare family name (`less`) expands to every
    // `less:*` target in declaration order. Only call once cycles are ruled out.
    fn expand_reference(&self, reference: &str) -> Option<Vec<&Step>> {
        if let Some(task) = self.task(reference) {
            let mut steps = Vec::new();
            for inner in &task.run {
                steps.extend(self.expand_reference(inner)?);
            }
            return Some(steps);
        }

        if let Some(target) = self.target(reference) {
            return Some(vec![target]);
        }

        if reference.contains(':') {
            return None;
        }

        let family: Vec<&Step> = self
            .targets
            .iter()
            .filter(|t| t.family() == reference)
            .collect();
        if family.is_empty() {
            None
        } else {
            Some(family)
        }
    }
}
