//! Pipeline execution: the step executor, the sequential engine and the
//! watch trigger

pub mod engine;
pub mod executor;
pub mod watch;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent, RunError};
pub use executor::StepExecutor;
pub use watch::{watch_loop, WatchTrigger};
