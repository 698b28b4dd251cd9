//! Test: Failure Handling - the first failing step stops the run

use crate::helpers::*;
use pushit_build::core::StepError;
use pushit_build::execution::ExecutionEngine;

#[tokio::test]
async fn test_syntax_error_aborts_before_concat() {
    let fixture = Fixture::new();
    fixture.write("src/broken.js", "function broken( {\n    return [1, 2;\n}\n");

    let toolchain = RecordingToolchain::default();
    let result = run_task_with(&fixture.project(), "dev", toolchain.clone()).await;
    assert_run_failed_at(&result, "jshint:src");

    match &result.result.as_ref().unwrap_err().source {
        StepError::Lint(diagnostics) => {
            assert!(!diagnostics.is_empty());
            assert!(diagnostics
                .iter()
                .all(|d| d.file.to_string_lossy() == "src/broken.js"));
        }
        other => panic!("Expected lint failure, got {:?}", other),
    }

    // Earlier outputs stay, nothing after the failure is written
    assert!(fixture.exists("build/templates.js"));
    assert!(fixture.exists("build/css/styles/main.css"));
    assert!(!fixture.exists("build/js"));
    assert!(!fixture.exists("build/pushit.js"));
    assert!(!fixture.exists("dist"));

    assert_eq!(result.completed_steps(), vec!["ngtemplates:pushit", "less:src"]);
    assert_eq!(result.skipped_steps().len(), result.pipeline.steps.len() - 3);
    assert!(toolchain.notifications().is_empty());
}

#[tokio::test]
async fn test_plain_syntax_error_aborts_src() {
    let fixture = Fixture::new();
    fixture.write("src/broken.js", "var x = ;\nvar = 3;\nfunction () {}\n");

    let result = run_task(&fixture.project(), "src").await;
    assert_run_failed_at(&result, "jshint:src");

    match &result.result.as_ref().unwrap_err().source {
        StepError::Lint(diagnostics) => {
            assert_eq!(diagnostics[0].file.to_string_lossy(), "src/broken.js");
            assert_eq!(diagnostics[0].line, 1);
        }
        other => panic!("Expected lint failure, got {:?}", other),
    }
    assert!(!fixture.exists("build/pushit.js"));
}

#[tokio::test]
async fn test_external_lint_report_fails_step() {
    use pushit_build::core::defaults;
    use pushit_build::tools::SystemToolchain;

    let fixture = Fixture::new();
    let mut config = defaults::pushit();
    config.tools.lint = Some("echo 'Expected an assignment.'; exit 1".to_string());
    let project = fixture.project_with(config);

    let toolchain = SystemToolchain::new(project.graph.tools.clone());
    let result = run_task_with(&project, "src", toolchain).await;
    assert_run_failed_at(&result, "jshint:src");
    match &result.result.as_ref().unwrap_err().source {
        StepError::Lint(diagnostics) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].file.to_string_lossy(), "src");
            assert_eq!(diagnostics[0].message, "Expected an assignment.");
        }
        other => panic!("Expected lint failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_keyword_property_division_builds() {
    let fixture = Fixture::new();
    fixture.write("src/math.js", "var range = { in: 4 };\nvar half = range.in / 2;\n");
    let project = fixture.project();

    assert_run_completed(&run_task(&project, "prd").await);
    assert!(fixture
        .read("dist/pushit/pushit-1.0.0.js")
        .contains("var half=range.in / 2;"));
}

#[tokio::test]
async fn test_failed_run_keeps_previous_bundle() {
    let fixture = Fixture::new();
    let project = fixture.project();
    assert_run_completed(&run_task(&project, "src").await);
    let before = fixture.read("build/pushit.js");

    fixture.write("src/app.js", "var app = 'unterminated;\n");
    let result = run_task(&project, "src").await;
    assert_run_failed_at(&result, "jshint:src");

    assert_eq!(fixture.read("build/pushit.js"), before);
}

#[tokio::test]
async fn test_forced_lint_only_warns() {
    let fixture = Fixture::new();
    fixture.write("test/broken.js", "describe('x', function () {\n");

    let result = run_task(&fixture.project(), "jshint:test").await;
    assert_run_completed(&result);
}

#[tokio::test]
async fn test_dev_succeeds_without_lib_scripts() {
    let fixture = Fixture::new();
    std::fs::remove_dir_all(fixture.path("lib/js")).unwrap();
    let project = fixture.project();

    let result = run_task(&project, "dev").await;
    assert_run_completed(&result);
    assert!(result.completed_steps().iter().any(|s| s == "concat:lib"));

    // The lib bundle is just the banner
    let lib = fixture.read("dist/pushit/pushit-lib-dev.js");
    assert!(lib.starts_with("/*"));
    assert!(!lib.contains("vendor"));

    assert_run_completed(&run_task(&project, "prd").await);
    assert!(fixture.exists("dist/pushit/pushit-lib-1.0.0.js"));
}

#[tokio::test]
async fn test_missing_marker_fails_unbundled_injection() {
    let fixture = Fixture::new();
    fixture.write("index.html", "<html><body></body></html>\n");

    let result = run_task(&fixture.project(), "srcJsUnbundled").await;
    assert_run_failed_at(&result, "insertJsFiles:srcJsUnbundled");
    assert!(matches!(
        result.result.as_ref().unwrap_err().source,
        StepError::Transform { .. }
    ));
}

#[tokio::test]
async fn test_unknown_placeholder_is_a_step_failure() {
    use pushit_build::core::{defaults, step::Notify, Step, StepKind};

    let fixture = Fixture::new();
    let mut config = defaults::pushit();
    config.targets.push(Step::new(
        "notify:custom",
        StepKind::Notify(Notify {
            message: "{{ pkg.homepage }}".to_string(),
        }),
    ));
    let project = fixture.project_with(config);

    let result = run_task(&project, "notify:custom").await;
    assert_run_failed_at(&result, "notify:custom");
    assert!(matches!(
        result.result.as_ref().unwrap_err().source,
        StepError::Config(_)
    ));
}

#[tokio::test]
async fn test_failure_events_are_emitted() {
    use pushit_build::execution::ExecutionEvent;
    use std::sync::{Arc, Mutex};

    let fixture = Fixture::new();
    fixture.write("src/broken.js", "var x = (1;\n");
    let project = fixture.project();

    let events = Arc::new(Mutex::new(Vec::new()));
    let engine = ExecutionEngine::new(RecordingToolchain::default());
    let sink = events.clone();
    engine
        .add_event_handler(move |event| {
            let label = match event {
                ExecutionEvent::RunStarted { .. } => "run-started".to_string(),
                ExecutionEvent::StepStarted { step, .. } => format!("start {}", step),
                ExecutionEvent::StepCompleted { step, .. } => format!("done {}", step),
                ExecutionEvent::StepFailed { step, .. } => format!("failed {}", step),
                ExecutionEvent::RunFinished { status, .. } => format!("finished {:?}", status),
            };
            sink.lock().unwrap().push(label);
        })
        .await;

    let mut pipeline = project.pipeline("src").unwrap();
    let ctx = project.context(built_at()).unwrap();
    assert!(engine.execute(&mut pipeline, &project.root, &ctx).await.is_err());

    let events = events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "run-started",
            "start ngtemplates:pushit",
            "done ngtemplates:pushit",
            "start less:src",
            "done less:src",
            "start jshint:src",
            "failed jshint:src",
            "finished Failed",
        ]
    );
}
