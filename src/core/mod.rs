//! Core domain models
//!
//! Steps, tasks, the task graph and its validation, the template context,
//! and run state.

pub mod config;
pub mod context;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod graph;
pub mod pipeline;
pub mod project;
pub mod state;
pub mod step;

pub use config::BuildConfig;
pub use context::{BuildContext, PackageInfo};
pub use error::{ConfigError, Diagnostic, StepError};
pub use filter::{not_git_file, PathFilter};
pub use graph::TaskGraph;
pub use pipeline::{Pipeline, PipelineStep};
pub use project::Project;
pub use state::{ExecutionStatus, RunState, StepState};
pub use step::{Step, StepKind};
