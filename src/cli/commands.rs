//! CLI command definitions

use clap::Args;

/// Run a task
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Task, target (`concat:src`) or target family (`less`)
    pub task: String,
}

/// Watch files and rerun a task
#[derive(Debug, Args, Clone)]
pub struct WatchCommand {
    /// Watch target, e.g. `dev` or `watch:devJsUnbundled`
    pub target: String,
}

/// List tasks
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate the task graph
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Print the validated configuration as JSON
    #[arg(long)]
    pub json: bool,
}
