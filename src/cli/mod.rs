//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ListCommand, RunCommand, ValidateCommand, WatchCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Build pipeline for the pushit web client
#[derive(Debug, Parser, Clone)]
#[command(name = "pushit-build")]
#[command(version)]
#[command(about = "Declarative build pipeline for the pushit web client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// YAML task graph replacing the built-in one
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a task, target or target family
    Run(RunCommand),

    /// Rerun a watch target's tasks whenever its files change
    Watch(WatchCommand),

    /// List tasks and the steps they resolve to
    List(ListCommand),

    /// Validate the task graph
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
