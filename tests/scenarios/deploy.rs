//! Test: Deploy - clean output, inject a configuration file, build dev

use crate::helpers::*;

#[tokio::test]
async fn test_deploy_local_injects_local_config() {
    let fixture = Fixture::new();
    let result = run_task(&fixture.project(), "deploy-local").await;
    assert_run_completed(&result);

    assert_eq!(
        fixture.read("build/conf/local.js"),
        "var config = \n{ \"user\": \"local\" };\n"
    );
    assert_eq!(
        fixture.read("dist/pushit/config.js"),
        fixture.read("build/conf/local.js")
    );
    assert!(fixture.exists("dist/pushit/pushit-dev.js"));
}

#[tokio::test]
async fn test_deploy_default_injects_default_config() {
    let fixture = Fixture::new();
    let result = run_task(&fixture.project(), "deploy-default").await;
    assert_run_completed(&result);

    assert!(fixture
        .read("dist/pushit/config.js")
        .contains("\"user\": \"default\""));
    assert!(!fixture.exists("build/conf/local.js"));
}

#[tokio::test]
async fn test_deploy_removes_stale_output() {
    let fixture = Fixture::new();
    fixture.write("build/stale.js", "old");
    fixture.write("dist/pushit/pushit-0.9.0.js", "old");

    let result = run_task(&fixture.project(), "deploy-local").await;
    assert_run_completed(&result);

    assert!(!fixture.exists("build/stale.js"));
    assert!(!fixture.exists("dist/pushit/pushit-0.9.0.js"));
    assert_eq!(result.pipeline.step_names()[0], "clean");
}

#[tokio::test]
async fn test_switching_configs_replaces_config_file() {
    let fixture = Fixture::new();
    let project = fixture.project();

    assert_run_completed(&run_task(&project, "deploy-local").await);
    assert_run_completed(&run_task(&project, "deploy-default").await);

    let config = fixture.read("dist/pushit/config.js");
    assert!(config.contains("default"));
    assert!(!config.contains("local"));
}
