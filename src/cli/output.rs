//! CLI output formatting

use crate::{
    core::{ExecutionStatus, StepState, TaskGraph},
    execution::ExecutionEvent,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static EYES: Emoji<'_, '_> = Emoji("👀 ", "* ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let bar_style =
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
    progress.set_style(bar_style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a step state for display
pub fn format_step_state(state: &StepState) -> String {
    match state {
        StepState::Pending => style("PENDING").dim().to_string(),
        StepState::Running { .. } => style("RUNNING").yellow().to_string(),
        StepState::Completed { artifacts, .. } => {
            style(format!("COMPLETED ({} files)", artifacts.len())).green().to_string()
        }
        StepState::Failed { .. } => style("FAILED").red().to_string(),
        StepState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted {
            execution_id,
            task,
            total_steps,
        } => format!(
            "{} Running {} ({} steps, {})",
            ROCKET,
            style(task).bold(),
            total_steps,
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted { step, index, total } => format!(
            "{} {} {}",
            SPINNER,
            style(format!("[{}/{}]", index + 1, total)).dim(),
            style(step).cyan()
        ),
        ExecutionEvent::StepCompleted { step, artifacts } => {
            if artifacts.is_empty() {
                format!("{} {}", CHECK, style(step).green())
            } else {
                format!(
                    "{} {} {}",
                    CHECK,
                    style(step).green(),
                    style(format!("({} files)", artifacts.len())).dim()
                )
            }
        }
        ExecutionEvent::StepFailed { step, error } => {
            format!("{} {}: {}", CROSS, style(step).red(), style(error).dim())
        }
        ExecutionEvent::RunFinished {
            execution_id,
            status,
        } => {
            let status_str = match status {
                ExecutionStatus::Completed => format!("completed {}", style("successfully").green()),
                ExecutionStatus::Failed => style("failed").red().to_string(),
                other => format_status(*other),
            };
            format!(
                "{} Run ({}) {}",
                INFO,
                style(&execution_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}

/// Console event handler: prints events above a per-run progress bar
#[derive(Clone, Default)]
pub struct ConsoleReporter {
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, event: &ExecutionEvent) {
        let Ok(mut bar) = self.bar.lock() else {
            println!("{}", format_execution_event(event));
            return;
        };

        if let ExecutionEvent::RunStarted { total_steps, .. } = event {
            if let Some(previous) = bar.take() {
                previous.finish_and_clear();
            }
            *bar = Some(create_progress_bar(*total_steps));
        }

        let line = format_execution_event(event);
        match bar.as_ref() {
            Some(progress) => progress.println(line),
            None => println!("{}", line),
        }

        match event {
            ExecutionEvent::StepStarted { step, .. } => {
                if let Some(progress) = bar.as_ref() {
                    progress.set_message(step.clone());
                }
            }
            ExecutionEvent::StepCompleted { .. } => {
                if let Some(progress) = bar.as_ref() {
                    progress.inc(1);
                }
            }
            ExecutionEvent::RunFinished { .. } => {
                if let Some(progress) = bar.take() {
                    progress.finish_and_clear();
                }
            }
            _ => {}
        }
    }
}

/// One line per task: `name  step, step, ...`
pub fn format_task_list(graph: &TaskGraph) -> Vec<String> {
    task_list_lines(graph, console::colors_enabled())
}

fn task_list_lines(graph: &TaskGraph, colors: bool) -> Vec<String> {
    let resolved = graph.resolved_names();
    let width = resolved.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    resolved
        .into_iter()
        .map(|(name, steps)| {
            // Escape codes must not count toward the width
            format!(
                "  {}  {}",
                style(format!("{:width$}", name, width = width))
                    .bold()
                    .force_styling(colors),
                style(steps.join(", ")).dim().force_styling(colors)
            )
        })
        .collect()
}
