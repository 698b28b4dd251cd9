//! Test utility functions for pushit-build
#![allow(dead_code)]

use pushit_build::core::{
    BuildConfig, Diagnostic, ExecutionStatus, Pipeline, Project, StepState,
};
use pushit_build::core::step::Language;
use pushit_build::execution::{ExecutionEngine, RunError};
use pushit_build::tools::{SystemToolchain, ToolError, Toolchain, ToolsConfig, UploadRequest};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html@@manifest>
<head>
    <link rel="stylesheet" href="/pushit/pushit-@@suffix.css">
</head>
<body data-env="@@env">
    <div ng-view></div>
    <script src="/pushit/pushit-lib-@@suffix.js"></script>
    <!-- inject:js -->
    <script src="/pushit/pushit-@@suffix.js"></script>
</body>
</html>
"#;

pub const APP_JS: &str = r#"var app = angular.module('pushit', ['ngRoute']);

app.config(['$routeProvider', '$locationProvider', function ($routeProvider, $locationProvider) {
    $routeProvider
        .when('/', { templateUrl: 'panes/home.html', controller: 'homeCtrl' })
        .otherwise({ redirectTo: '/' });
    $locationProvider.html5Mode({ enabled: true, requireBase: false });
}]);
"#;

pub const HOME_CTRL_JS: &str = r#"app.controller('homeCtrl', ['$scope', function ($scope) {
    // greeting shown on the home pane
    $scope.greeting = "Hello, " + config.user + "!";
}]);
"#;

pub const MAIN_LESS: &str = r#"@brand: #3366cc;
@gutter: 10px;

body {
    color: @brand;
    margin: @gutter;
}
"#;

/// Fixed build time so artifacts are reproducible
pub fn built_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// A pushit source tree in a temporary directory
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };

        fixture.write(
            "package.json",
            r#"{ "name": "pushit", "version": "1.0.0", "author": "Jane Doe" }"#,
        );
        fixture.write("index.html", INDEX_HTML);
        fixture.write("src/index.html", "<html>unused by the template cache</html>\n");
        fixture.write("src/app.js", APP_JS);
        fixture.write("src/controllers/home.js", HOME_CTRL_JS);
        fixture.write("src/panes/home.html", "<h1>{{ greeting }}</h1>\n");
        fixture.write("src/styles/main.less", MAIN_LESS);
        fixture.write("src/assets/img/logo.png", "PNG");
        fixture.write("lib/fonts/icons/x.woff", "WOFF");
        fixture.write("lib/js/vendor.js", "/* vendor v2 */\nvar vendor = {};\n");
        fixture.write("conf/local.js", "{ \"user\": \"local\" }");
        fixture.write("conf/default.js", "{ \"user\": \"default\" }");
        fixture.write("test/spec.js", "describe('app', function () {});\n");

        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root().join(file)
    }

    pub fn write(&self, file: &str, content: &str) {
        let path = self.path(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, file: &str) -> String {
        std::fs::read_to_string(self.path(file))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", file, e))
    }

    pub fn exists(&self, file: &str) -> bool {
        self.path(file).exists()
    }

    /// Files below `dir`, relative to it, sorted
    pub fn files_under(&self, dir: &str) -> Vec<String> {
        fn walk(base: &Path, dir: &Path, out: &mut Vec<String>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(base, &path, out);
                } else {
                    let relative = path.strip_prefix(base).unwrap();
                    out.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }

        let base = self.path(dir);
        let mut out = Vec::new();
        if base.is_dir() {
            walk(&base, &base, &mut out);
        }
        out.sort();
        out
    }

    /// Project using the built-in task graph
    pub fn project(&self) -> Project {
        Project::load(self.root(), None).unwrap()
    }

    pub fn project_with(&self, config: BuildConfig) -> Project {
        Project::from_config(self.root(), config, None).unwrap()
    }
}

/// Toolchain recording notifications and uploads, delegating the rest to the
/// built-in transformers
#[derive(Clone, Default)]
pub struct RecordingToolchain {
    inner: Arc<SystemToolchain>,
    pub notified: Arc<Mutex<Vec<String>>>,
    pub uploaded: Arc<Mutex<Vec<UploadRequest>>>,
}

#[async_trait]
impl Toolchain for RecordingToolchain {
    async fn compile_style(&self, input: &Path) -> Result<String, ToolError> {
        self.inner.compile_style(input).await
    }

    async fn lint(&self, files: &[PathBuf]) -> Result<Vec<Diagnostic>, ToolError> {
        self.inner.lint(files).await
    }

    async fn minify(&self, language: Language, input: &Path) -> Result<String, ToolError> {
        self.inner.minify(language, input).await
    }

    async fn notify(&self, message: &str) -> Result<(), ToolError> {
        self.notified.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn upload(&self, request: &UploadRequest) -> Result<(), ToolError> {
        self.uploaded.lock().unwrap().push(request.clone());
        Ok(())
    }
}

impl RecordingToolchain {
    pub fn notifications(&self) -> Vec<String> {
        self.notified.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploaded.lock().unwrap().clone()
    }
}

/// Result of running a task
pub struct RunResult {
    pub pipeline: Pipeline,
    pub result: Result<(), RunError>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.result.is_ok() && self.pipeline.state.status == ExecutionStatus::Completed
    }

    pub fn completed_steps(&self) -> Vec<String> {
        self.steps_where(|s| matches!(s, StepState::Completed { .. }))
    }

    pub fn skipped_steps(&self) -> Vec<String> {
        self.steps_where(|s| matches!(s, StepState::Skipped { .. }))
    }

    pub fn failed_step(&self) -> Option<String> {
        self.steps_where(|s| matches!(s, StepState::Failed { .. }))
            .into_iter()
            .next()
    }

    fn steps_where(&self, pred: impl Fn(&StepState) -> bool) -> Vec<String> {
        self.pipeline
            .steps
            .iter()
            .filter(|s| pred(&s.state))
            .map(|s| s.step.name.clone())
            .collect()
    }
}

/// Run `task` of `project` with `toolchain` and the fixed build time
pub async fn run_task_with<T: Toolchain + 'static>(
    project: &Project,
    task: &str,
    toolchain: T,
) -> RunResult {
    let mut pipeline = project.pipeline(task).unwrap();
    let ctx = project.context(built_at()).unwrap();
    let engine = ExecutionEngine::new(toolchain);
    let result = engine.execute(&mut pipeline, &project.root, &ctx).await;
    RunResult { pipeline, result }
}

/// Run `task` with the built-in transformers
pub async fn run_task(project: &Project, task: &str) -> RunResult {
    run_task_with(project, task, SystemToolchain::new(ToolsConfig::default())).await
}

pub fn assert_run_completed(result: &RunResult) {
    assert!(
        result.is_success(),
        "Expected run to complete, got {:?} (failed step: {:?})",
        result.result.as_ref().err().map(|e| e.to_string()),
        result.failed_step()
    );
}

pub fn assert_run_failed_at(result: &RunResult, step: &str) {
    let err = result
        .result
        .as_ref()
        .err()
        .unwrap_or_else(|| panic!("Expected run to fail at {}", step));
    assert_eq!(err.step, step);
    assert_eq!(result.pipeline.state.status, ExecutionStatus::Failed);
    assert_eq!(result.failed_step().as_deref(), Some(step));
}
