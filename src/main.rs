use pushit_build::cli::commands::{ListCommand, RunCommand, ValidateCommand, WatchCommand};
use pushit_build::cli::output::*;
use pushit_build::cli::{Cli, Command};
use pushit_build::core::{ConfigError, PackageInfo, Pipeline, Project};
use pushit_build::execution::watch::{watch, DEBOUNCE};
use pushit_build::execution::{watch_loop, ExecutionEngine, WatchTrigger};
use pushit_build::tools::SystemToolchain;

use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let project = Project::load(&cli.root, cli.file.as_deref())?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_task(cmd, &project).await?,
        Command::Watch(cmd) => watch_target(cmd, &project).await?,
        Command::List(cmd) => list_tasks(cmd, &project)?,
        Command::Validate(cmd) => validate_project(cmd, &project)?,
    }

    Ok(())
}

fn engine_for(project: &Project) -> ExecutionEngine<SystemToolchain> {
    ExecutionEngine::new(SystemToolchain::new(project.graph.tools.clone()))
}

/// Run one pipeline to completion, reporting through the console
async fn build_once(
    engine: &ExecutionEngine<SystemToolchain>,
    project: &Project,
    pipeline: Result<Pipeline, ConfigError>,
) -> Result<bool> {
    let mut pipeline = pipeline?;
    let ctx = project
        .context(Local::now().naive_local())
        .context("Failed to build template context")?;

    match engine.execute(&mut pipeline, &project.root, &ctx).await {
        Ok(()) => Ok(true),
        Err(e) => {
            error!("{}", e);
            Ok(false)
        }
    }
}

async fn run_task(cmd: &RunCommand, project: &Project) -> Result<()> {
    println!(
        "{} Project {} at {}",
        INFO,
        style(&project.graph.name).bold(),
        style(project.root.display()).dim()
    );

    let engine = engine_for(project);
    let reporter = ConsoleReporter::new();
    engine
        .add_event_handler(move |event| reporter.handle(&event))
        .await;

    let succeeded = build_once(&engine, project, project.pipeline(&cmd.task)).await?;

    if succeeded {
        println!(
            "\n{} {} completed {}",
            CHECK,
            style(&cmd.task).bold(),
            style("successfully").green()
        );
    } else {
        println!("\n{} {} {}", CROSS, style(&cmd.task).bold(), style("failed").red());
        std::process::exit(1);
    }

    Ok(())
}

async fn watch_target(cmd: &WatchCommand, project: &Project) -> Result<()> {
    let files = project.watch_files(&cmd.target)?;
    // Fail early on an unknown task list
    project.watch_pipeline(&cmd.target)?;

    let trigger = WatchTrigger::new(&project.root, &files)?;
    let (_debouncer, mut rx) =
        watch(trigger.root(), DEBOUNCE).context("Failed to start file watcher")?;

    println!(
        "{} Watching {} for {}",
        EYES,
        style(files.join(", ")).cyan(),
        style(&cmd.target).bold()
    );

    let engine = engine_for(project);
    let reporter = ConsoleReporter::new();
    engine
        .add_event_handler(move |event| reporter.handle(&event))
        .await;

    let engine = &engine;
    let target = cmd.target.as_str();
    let run = move || async move {
        match build_once(engine, project, project.watch_pipeline(target)).await {
            Ok(succeeded) => succeeded,
            Err(e) => {
                warn!("{:#}", e);
                false
            }
        }
    };

    tokio::select! {
        runs = watch_loop(&trigger, &mut rx, run) => {
            println!("{} Watcher stopped after {} run(s)", INFO, runs);
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n{} Stopped watching", INFO);
        }
    }

    Ok(())
}

fn list_tasks(cmd: &ListCommand, project: &Project) -> Result<()> {
    let graph = &project.graph;

    if cmd.json {
        let tasks: Vec<_> = graph
            .tasks()
            .iter()
            .zip(graph.resolved_names())
            .map(|(task, (_, steps))| {
                serde_json::json!({
                    "name": task.name,
                    "run": task.run,
                    "steps": steps,
                })
            })
            .collect();
        let targets: Vec<_> = graph.targets().iter().map(|t| t.name.as_str()).collect();
        let watches: Vec<_> = graph
            .watches()
            .iter()
            .map(|w| {
                serde_json::json!({
                    "name": w.name,
                    "files": w.files,
                    "tasks": w.tasks,
                })
            })
            .collect();
        let data = serde_json::json!({
            "name": graph.name,
            "tasks": tasks,
            "targets": targets,
            "watch": watches,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Tasks of {}:", INFO, style(&graph.name).bold());
    for line in format_task_list(graph) {
        println!("{}", line);
    }

    println!("\n{} Targets:", INFO);
    for target in graph.targets() {
        println!("  {}", style(&target.name).cyan());
    }

    if !graph.watches().is_empty() {
        println!("\n{} Watch targets:", INFO);
        for watch in graph.watches() {
            println!(
                "  {} {} -> {}",
                style(&watch.name).bold(),
                style(watch.files.join(", ")).dim(),
                watch.tasks.join(", ")
            );
        }
    }

    Ok(())
}

fn validate_project(cmd: &ValidateCommand, project: &Project) -> Result<()> {
    println!("{} Validating task graph...", INFO);

    let graph = &project.graph;
    println!("{} Task graph is valid!", CHECK);
    println!("  Name: {}", style(&graph.name).bold());
    println!("  Targets: {}", style(graph.targets().len()).cyan());
    println!("  Tasks: {}", style(graph.tasks().len()).cyan());
    println!("  Watch targets: {}", style(graph.watches().len()).cyan());

    let package = project.root.join(&graph.package);
    let package_ok = check_package(&package);

    if cmd.json {
        let json = serde_json::to_string_pretty(&project.config)?;
        println!("\n{}", json);
    }

    if !package_ok {
        std::process::exit(1);
    }
    Ok(())
}

fn check_package(path: &Path) -> bool {
    match PackageInfo::from_file(path) {
        Ok(package) => {
            println!(
                "  Package: {} v{}",
                style(&package.name).bold(),
                style(&package.version).cyan()
            );
            true
        }
        Err(e) => {
            println!("{} Package metadata:", CROSS);
            println!("  {}", style(e).red());
            false
        }
    }
}
