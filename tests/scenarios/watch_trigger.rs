//! Test: Watch Trigger - source changes rerun the bound task

use crate::helpers::*;
use pushit_build::execution::watch::{watch, DEBOUNCE};
use pushit_build::execution::{watch_loop, ExecutionEngine, WatchTrigger};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_one_source_change_one_dev_run() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let trigger = WatchTrigger::new(&project.root, &project.watch_files("dev").unwrap()).unwrap();

    let toolchain = RecordingToolchain::default();
    let engine = ExecutionEngine::new(toolchain.clone());
    let (tx, mut rx) = mpsc::channel(10);
    tx.send(vec![trigger.root().join("src/app.js")]).await.unwrap();
    drop(tx);

    let engine = &engine;
    let project = &project;
    let runs = watch_loop(&trigger, &mut rx, move || async move {
        let mut pipeline = project.watch_pipeline("dev").unwrap();
        let ctx = project.context(built_at()).unwrap();
        engine.execute(&mut pipeline, &project.root, &ctx).await.is_ok()
    })
    .await;

    assert_eq!(runs, 1);
    assert_eq!(toolchain.notifications(), vec!["Development build successful."]);
    assert!(fixture.exists("dist/pushit/pushit-dev.js"));
}

#[tokio::test]
async fn test_fix_after_failure_rebuilds() {
    let fixture = Fixture::new();
    fixture.write("src/app.js", "var app = (;\n");
    let project = fixture.project();
    let trigger = WatchTrigger::new(&project.root, &project.watch_files("dev").unwrap()).unwrap();

    let toolchain = RecordingToolchain::default();
    let engine = ExecutionEngine::new(toolchain.clone());
    let (tx, mut rx) = mpsc::channel(10);
    tx.send(vec![trigger.root().join("src/app.js")]).await.unwrap();

    let engine = &engine;
    let project = &project;
    let fixture = &fixture;
    let root = trigger.root().to_path_buf();
    let mut sender = Some(tx);

    let runs = watch_loop(&trigger, &mut rx, move || {
        // The broken build gets fixed while it runs
        if let Some(tx) = sender.take() {
            fixture.write("src/app.js", APP_JS);
            tx.try_send(vec![root.join("src/app.js")]).unwrap();
        }
        async move {
            let mut pipeline = project.watch_pipeline("dev").unwrap();
            let ctx = project.context(built_at()).unwrap();
            engine.execute(&mut pipeline, &project.root, &ctx).await.is_ok()
        }
    })
    .await;

    assert_eq!(runs, 2);
    assert_eq!(toolchain.notifications().len(), 1);
    assert!(fixture.exists("dist/pushit/pushit-dev.js"));
}

#[test]
fn test_build_output_does_not_retrigger() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let trigger = WatchTrigger::new(&project.root, &project.watch_files("dev").unwrap()).unwrap();

    assert!(!trigger.matches(&trigger.root().join("build/pushit.js")));
    assert!(!trigger.matches(&trigger.root().join("dist/index.html")));
    assert!(trigger.matches(&trigger.root().join("src/styles/main.less")));
    assert!(trigger.matches(&trigger.root().join("package.json")));
}

#[tokio::test]
async fn test_filesystem_changes_are_delivered() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let trigger = WatchTrigger::new(&project.root, &project.watch_files("dev").unwrap()).unwrap();
    let (_debouncer, mut rx) = watch(trigger.root(), DEBOUNCE).unwrap();

    // Give the watcher a moment to register before touching files
    tokio::time::sleep(Duration::from_millis(100)).await;
    fixture.write("src/app.js", "var app = {};\n");

    let batch = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match rx.recv().await {
                Some(batch) if trigger.any_match(&batch) => return batch,
                Some(_) => continue,
                None => panic!("Watcher closed"),
            }
        }
    })
    .await
    .expect("No change delivered");

    assert!(batch.iter().any(|p| p.ends_with("src/app.js")));
}
