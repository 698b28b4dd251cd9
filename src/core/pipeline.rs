//! Pipeline - one task resolved into the steps a run will execute

use crate::core::{
    error::ConfigError,
    graph::TaskGraph,
    state::{RunState, StepState},
    step::Step,
};
use chrono::Utc;

/// A step together with its runtime state
#[derive(Debug, Clone)]
pub struct PipelineStep {
    pub step: Step,
    pub state: StepState,
}

/// The resolved, ordered step list of a task plus run state
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Task (or target) the pipeline was resolved from
    pub task: String,

    /// Steps in execution order
    pub steps: Vec<PipelineStep>,

    /// Execution state
    pub state: RunState,
}

impl Pipeline {
    /// Resolve `task` against the graph
    pub fn from_graph(graph: &TaskGraph, task: &str) -> Result<Self, ConfigError> {
        let steps = graph.resolve(task)?;
        Ok(Self::from_steps(task, steps.into_iter().cloned().collect()))
    }

    /// Build a pipeline from an explicit step list
    pub fn from_steps(task: &str, steps: Vec<Step>) -> Self {
        Pipeline {
            task: task.to_string(),
            steps: steps
                .into_iter()
                .map(|step| PipelineStep {
                    step,
                    state: StepState::Pending,
                })
                .collect(),
            state: RunState::new(),
        }
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step.name.as_str()).collect()
    }

    /// Check if every step finished successfully
    pub fn is_complete(&self) -> bool {
        self.steps
            .iter()
            .all(|s| matches!(s.state, StepState::Completed { .. }))
    }

    /// Check if a step failed
    pub fn has_failed(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s.state, StepState::Failed { .. }))
    }

    /// Mark step `index` as running
    pub fn mark_running(&mut self, index: usize) {
        if let Some(entry) = self.steps.get_mut(index) {
            entry.state = StepState::Running {
                started_at: Utc::now(),
            };
        }
    }

    /// Mark step `index` as completed with the artifacts it wrote
    pub fn mark_completed(&mut self, index: usize, artifacts: Vec<std::path::PathBuf>) {
        if let Some(entry) = self.steps.get_mut(index) {
            let started_at = match &entry.state {
                StepState::Running { started_at } => *started_at,
                _ => Utc::now(),
            };
            entry.state = StepState::Completed {
                artifacts,
                started_at,
                completed_at: Utc::now(),
            };
            self.state.completed_steps += 1;
        }
    }

    /// Mark step `index` as failed and every later step as skipped
    pub fn mark_failed(&mut self, index: usize, error: String) {
        let failed_name = match self.steps.get_mut(index) {
            Some(entry) => {
                let started_at = match &entry.state {
                    StepState::Running { started_at } => *started_at,
                    _ => Utc::now(),
                };
                entry.state = StepState::Failed {
                    error,
                    started_at,
                    failed_at: Utc::now(),
                };
                self.state.failed_steps += 1;
                entry.step.name.clone()
            }
            None => return,
        };

        for entry in self.steps.iter_mut().skip(index + 1) {
            entry.state = StepState::Skipped {
                reason: format!("{} failed", failed_name),
            };
        }
    }
}
