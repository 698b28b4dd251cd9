//! Main execution engine - runs a pipeline's steps in order

use crate::{
    core::{BuildContext, ExecutionStatus, Pipeline, StepError},
    execution::StepExecutor,
    tools::Toolchain,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        execution_id: Uuid,
        task: String,
        total_steps: usize,
    },
    StepStarted {
        step: String,
        index: usize,
        total: usize,
    },
    StepCompleted {
        step: String,
        artifacts: Vec<PathBuf>,
    },
    StepFailed {
        step: String,
        error: String,
    },
    RunFinished {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// A run stopped at a failing step
#[derive(Debug, Error)]
#[error("Step '{step}' failed: {source}")]
pub struct RunError {
    pub step: String,
    #[source]
    pub source: StepError,
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Sequential pipeline execution engine
pub struct ExecutionEngine<T> {
    executor: Arc<StepExecutor<T>>,
    event_handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl<T: Toolchain + 'static> ExecutionEngine<T> {
    pub fn new(toolchain: T) -> Self {
        Self {
            executor: Arc::new(StepExecutor::new(toolchain)),
            event_handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn executor(&self) -> &StepExecutor<T> {
        &self.executor
    }

    /// Add an event handler
    pub async fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.lock().await.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    async fn emit_event(&self, event: ExecutionEvent) {
        let handlers = self.event_handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Execute the pipeline, stopping at the first failing step.
    ///
    /// Outputs written before the failure stay on disk.
    pub async fn execute(
        &self,
        pipeline: &mut Pipeline,
        root: &Path,
        ctx: &BuildContext,
    ) -> Result<(), RunError> {
        let execution_id = pipeline.state.execution_id;
        let total = pipeline.steps.len();

        info!(
            "Starting run of '{}' ({} steps, {})",
            pipeline.task, total, execution_id
        );
        self.emit_event(ExecutionEvent::RunStarted {
            execution_id,
            task: pipeline.task.clone(),
            total_steps: total,
        })
        .await;

        pipeline.state.start(total);

        for index in 0..total {
            let step = pipeline.steps[index].step.clone();

            pipeline.mark_running(index);
            self.emit_event(ExecutionEvent::StepStarted {
                step: step.name.clone(),
                index,
                total,
            })
            .await;

            match self.executor.execute(root, &step, ctx).await {
                Ok(artifacts) => {
                    pipeline.mark_completed(index, artifacts.clone());
                    self.emit_event(ExecutionEvent::StepCompleted {
                        step: step.name.clone(),
                        artifacts,
                    })
                    .await;
                }
                Err(e) => {
                    error!("Step {} failed: {}", step.name, e);
                    pipeline.mark_failed(index, e.to_string());
                    pipeline.state.fail();
                    self.emit_event(ExecutionEvent::StepFailed {
                        step: step.name.clone(),
                        error: e.to_string(),
                    })
                    .await;
                    self.emit_event(ExecutionEvent::RunFinished {
                        execution_id,
                        status: ExecutionStatus::Failed,
                    })
                    .await;
                    return Err(RunError {
                        step: step.name,
                        source: e,
                    });
                }
            }
        }

        pipeline.state.complete();
        info!("Run of '{}' finished", pipeline.task);
        self.emit_event(ExecutionEvent::RunFinished {
            execution_id,
            status: ExecutionStatus::Completed,
        })
        .await;

        Ok(())
    }
}
