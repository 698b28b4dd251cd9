//! Test: Upload - site buckets receive the dist tree

use crate::helpers::*;
use pushit_build::core::{defaults, StepError};
use pushit_build::tools::{subprocess::shell_quote, SystemToolchain, ToolError, ToolsConfig};
use tempfile::TempDir;

const SITE: &str = "pushit.example.com";

fn site_project(fixture: &Fixture, upload: Option<String>) -> pushit_build::core::Project {
    let mut config = defaults::pushit();
    config.sites = vec![SITE.to_string()];
    config.tools = ToolsConfig {
        upload,
        ..ToolsConfig::default()
    };
    fixture.project_with(config)
}

#[tokio::test]
async fn test_site_upload_destinations() {
    let fixture = Fixture::new();
    let project = site_project(&fixture, None);
    assert_run_completed(&run_task(&project, "prd").await);

    let toolchain = RecordingToolchain::default();
    let result = run_task_with(&project, &format!("s3:{}", SITE), toolchain.clone()).await;
    assert_run_completed(&result);

    let uploads = toolchain.uploads();
    assert!(uploads.iter().all(|u| u.bucket == SITE && u.access == "public-read"));

    let mut dests: Vec<_> = uploads.iter().map(|u| u.dest.as_str()).collect();
    dests.sort();
    assert_eq!(
        dests,
        vec![
            "/index.html",
            "/manifest.appcache",
            "/pushit/assets/logo.png",
            "/pushit/fonts/x.woff",
            "/pushit/pushit-1.0.0.css",
            "/pushit/pushit-1.0.0.js",
            "/pushit/pushit-lib-1.0.0.js",
        ]
    );
}

#[tokio::test]
async fn test_upload_command_receives_each_file() {
    let fixture = Fixture::new();
    let bucket_dir = TempDir::new().unwrap();
    let out = shell_quote(&bucket_dir.path().to_string_lossy());
    let command = format!(
        "mkdir -p {out}/{{bucket}}$(dirname {{dest}}) && cp {{file}} {out}/{{bucket}}{{dest}}",
        out = out
    );

    let project = site_project(&fixture, Some(command));
    assert_run_completed(&run_task(&project, "prd").await);

    let toolchain = SystemToolchain::new(project.graph.tools.clone());
    let result = run_task_with(&project, "s3", toolchain).await;
    assert_run_completed(&result);

    let uploaded = bucket_dir.path().join(SITE);
    assert_eq!(
        std::fs::read_to_string(uploaded.join("index.html")).unwrap(),
        fixture.read("dist/index.html")
    );
    assert!(uploaded.join("pushit/pushit-1.0.0.js").is_file());
    assert!(uploaded.join("pushit/assets/logo.png").is_file());
}

#[tokio::test]
async fn test_upload_without_command_fails() {
    let fixture = Fixture::new();
    let project = site_project(&fixture, None);
    assert_run_completed(&run_task(&project, "prd").await);

    let result = run_task(&project, &format!("s3:{}", SITE)).await;
    assert_run_failed_at(&result, "s3:pushit.example.com");
    assert!(matches!(
        result.result.as_ref().unwrap_err().source,
        StepError::Tool(ToolError::NotConfigured("upload"))
    ));
}

#[tokio::test]
async fn test_upload_before_build_has_nothing_to_send() {
    let fixture = Fixture::new();
    let project = site_project(&fixture, None);

    let result = run_task_with(&project, "s3", RecordingToolchain::default()).await;
    assert!(matches!(
        result.result.as_ref().unwrap_err().source,
        StepError::NoSources { .. }
    ));
}
