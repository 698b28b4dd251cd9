//! pushit-build - declarative build pipeline for the pushit web client

pub mod cli;
pub mod core;
pub mod execution;
pub mod tools;

// Re-export commonly used types
pub use core::{
    not_git_file, BuildConfig, BuildContext, ExecutionStatus, Pipeline, Project, Step, StepKind,
    StepState, TaskGraph,
};
pub use execution::{ExecutionEngine, ExecutionEvent, WatchTrigger};
pub use tools::{SystemToolchain, Toolchain};
