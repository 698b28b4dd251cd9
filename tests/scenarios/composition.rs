//! Test: Composition - tasks resolve to the expected ordered step lists

use pushit_build::core::{defaults, BuildConfig, ConfigError};

fn steps(config: &BuildConfig, task: &str) -> Vec<String> {
    config
        .to_graph()
        .unwrap()
        .resolve(task)
        .unwrap()
        .iter()
        .map(|s| s.name.clone())
        .collect()
}

#[test]
fn test_dev_extends_src() {
    let config = defaults::pushit();
    let mut expected = steps(&config, "src");
    expected.extend(["replace:dev", "copy:dev", "copy:assets", "notify:dev"].map(String::from));
    assert_eq!(steps(&config, "dev"), expected);
}

#[test]
fn test_unbundled_variant_differs_only_in_injection() {
    let config = defaults::pushit();
    let src = steps(&config, "src");
    let unbundled = steps(&config, "srcJsUnbundled");
    assert_eq!(src.len(), unbundled.len());

    let differing: Vec<_> = src
        .iter()
        .zip(&unbundled)
        .filter(|(a, b)| a != b)
        .map(|(a, b)| (a.as_str(), b.as_str()))
        .collect();
    assert_eq!(
        differing,
        vec![
            ("insertJsFiles:src", "insertJsFiles:srcJsUnbundled"),
            ("concat:src", "concat:srcJsUnbundled"),
        ]
    );
}

#[test]
fn test_family_reference_runs_every_target() {
    let config = defaults::pushit();
    assert_eq!(
        steps(&config, "copy"),
        vec!["copy:configfile", "copy:dev", "copy:devJsUnbundled", "copy:assets"]
    );
}

#[test]
fn test_yaml_graph_composes_like_builtin() {
    let yaml = r#"
name: "demo"
targets:
  - name: "clean"
    kind: clean
    paths: ["build/"]
  - name: "notify:done"
    kind: notify
    message: "{{ pkg.name }} built"
tasks:
  - name: "inner"
    run: ["clean"]
  - name: "outer"
    run: ["inner", "notify:done"]
"#;
    let config = BuildConfig::from_yaml(yaml).unwrap();
    assert_eq!(steps(&config, "outer"), vec!["clean", "notify:done"]);
}

#[test]
fn test_cycle_rejected_before_running() {
    let yaml = r#"
name: "cyclic"
targets:
  - name: "clean"
    kind: clean
    paths: ["build/"]
tasks:
  - name: "a"
    run: ["clean", "b"]
  - name: "b"
    run: ["a"]
"#;
    let err = BuildConfig::from_yaml(yaml).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Cycle(_))
    ));
}

#[test]
fn test_unknown_reference_rejected() {
    let yaml = r#"
name: "broken"
targets: []
tasks:
  - name: "dev"
    run: ["does-not-exist"]
"#;
    let err = BuildConfig::from_yaml(yaml).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::UnknownReference { .. })
    ));
}
