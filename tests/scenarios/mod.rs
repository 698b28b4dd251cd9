//! Scenario-based tests for pushit-build

mod composition;
mod deploy;
mod failure_handling;
mod upload;
mod watch_trigger;
