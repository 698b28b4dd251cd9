//! Built-in task graph for the pushit client

use crate::core::{
    config::{BuildConfig, TaskConfig, WatchConfig},
    context::DEFAULT_BANNER,
    filter::PathFilter,
    step::*,
};
use crate::tools::ToolsConfig;
use std::collections::BTreeMap;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn concat(name: &str, src: &[&str], dest: &str) -> Step {
    Step::new(
        name,
        StepKind::Concatenate(Concatenate {
            src: strings(src),
            dest: dest.to_string(),
            banner: true,
            strip_banners: true,
            separator: "\n".to_string(),
            allow_empty: false,
        }),
    )
}

// Third-party scripts are optional; without them the lib bundle is just the banner
fn optional_concat(name: &str, src: &[&str], dest: &str) -> Step {
    let mut step = concat(name, src, dest);
    if let StepKind::Concatenate(c) = &mut step.kind {
        c.allow_empty = true;
    }
    step
}

// Wraps a `conf/` file into `var config = ...;` under `build/conf/`
fn config_file(name: &str, file: &str) -> Step {
    Step::new(
        name,
        StepKind::NamespaceWrap(NamespaceWrap {
            src: vec![format!("conf/{}", file)],
            cwd: None,
            dest: "build/".to_string(),
            before: "var config = \n".to_string(),
            after: ";\n".to_string(),
            filter: None,
        }),
    )
}

fn replace(name: &str, vars: &[(&str, &str)]) -> Step {
    let variables: BTreeMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Step::new(
        name,
        StepKind::VariableSubstitute(VariableSubstitute {
            src: "build/index.html".to_string(),
            dest: "dist/index.html".to_string(),
            prefix: "@@".to_string(),
            variables,
        }),
    )
}

fn expand(src: &str, dest: &str, cwd: Option<&str>, flatten: bool) -> CopyRule {
    CopyRule {
        src: vec![src.to_string()],
        dest: dest.to_string(),
        cwd: cwd.map(str::to_string),
        expand: true,
        flatten,
        filter: None,
    }
}

fn notify(name: &str, message: &str) -> Step {
    Step::new(
        name,
        StepKind::Notify(Notify {
            message: message.to_string(),
        }),
    )
}

/// Leaf steps of the pushit build
pub fn targets() -> Vec<Step> {
    vec![
        Step::new(
            "clean",
            StepKind::Clean(Clean {
                paths: strings(&["build/", "dist/"]),
            }),
        ),
        Step::new(
            "ngtemplates:pushit",
            StepKind::TemplateCompile(TemplateCompile {
                src: strings(&["src/**/*.html", "!src/index.html"]),
                dest: "build/templates.js".to_string(),
                base: Some("src/".to_string()),
                module: "pushit".to_string(),
            }),
        ),
        Step::new(
            "less:src",
            StepKind::StyleCompile(StyleCompile {
                src: strings(&["**/*.less"]),
                cwd: Some("src/".to_string()),
                dest: "build/css/".to_string(),
                ext: ".css".to_string(),
                filter: Some(PathFilter::NotGitFile),
            }),
        ),
        Step::new(
            "jshint:src",
            StepKind::Lint(Lint {
                src: strings(&["src/**/*.js"]),
                filter: Some(PathFilter::NotGitFile),
                force: false,
            }),
        ),
        Step::new(
            "jshint:test",
            StepKind::Lint(Lint {
                src: strings(&["test/**/*.js"]),
                filter: None,
                force: true,
            }),
        ),
        Step::new(
            "wrap:closure",
            StepKind::NamespaceWrap(NamespaceWrap {
                src: strings(&["src/**/*.js"]),
                cwd: None,
                dest: "build/js/".to_string(),
                before: "(function () {\n".to_string(),
                after: "})();\n".to_string(),
                filter: Some(PathFilter::NotGitFile),
            }),
        ),
        config_file("wrap:localconf", "local.js"),
        config_file("wrap:configfile", "default.js"),
        Step::new(
            "commonjs:modules",
            StepKind::ModuleWrap(ModuleWrap {
                src: strings(&["**/*.js"]),
                cwd: Some("src/".to_string()),
                dest: "build/js/".to_string(),
                filter: Some(PathFilter::NotGitFile),
            }),
        ),
        Step::new(
            "insertJsFiles:src",
            StepKind::ReferenceInject(ReferenceInject {
                src: "index.html".to_string(),
                dest: "build/index.html".to_string(),
                js_base_dir: None,
                js_files: None,
                append_path: String::new(),
            }),
        ),
        Step::new(
            "insertJsFiles:srcJsUnbundled",
            StepKind::ReferenceInject(ReferenceInject {
                src: "index.html".to_string(),
                dest: "build/index.html".to_string(),
                js_base_dir: Some("build/js/src".to_string()),
                js_files: Some("**/*.js".to_string()),
                append_path: "/pushit/js/".to_string(),
            }),
        ),
        concat(
            "concat:src",
            &["build/js/**/*.js", "build/templates.js"],
            "build/{{ pkg.name }}.js",
        ),
        concat(
            "concat:srcJsUnbundled",
            &["build/templates.js"],
            "build/{{ pkg.name }}.js",
        ),
        optional_concat("concat:lib", &["lib/js/**/*.js"], "build/{{ pkg.name }}-lib.js"),
        concat("concat:css", &["build/css/**/*.css"], "build/{{ pkg.name }}.css"),
        Step::new(
            "uglify:prd",
            StepKind::Minify(Minify {
                language: Language::Script,
                files: vec![
                    FileMapping::new(
                        "dist/pushit/{{ pkg.name }}-{{ pkg.version }}.js",
                        "build/{{ pkg.name }}.js",
                    ),
                    FileMapping::new(
                        "dist/pushit/{{ pkg.name }}-lib-{{ pkg.version }}.js",
                        "build/{{ pkg.name }}-lib.js",
                    ),
                ],
                banner: true,
            }),
        ),
        Step::new(
            "mincss:prd",
            StepKind::Minify(Minify {
                language: Language::Style,
                files: vec![FileMapping::new(
                    "dist/pushit/{{ pkg.name }}-{{ pkg.version }}.css",
                    "build/{{ pkg.name }}.css",
                )],
                banner: true,
            }),
        ),
        Step::new(
            "copy:configfile",
            StepKind::Copy(CopyFiles {
                files: vec![CopyRule::file("dist/pushit/config.js", "build/conf/*")],
            }),
        ),
        Step::new(
            "copy:dev",
            StepKind::Copy(CopyFiles {
                files: vec![
                    CopyRule::file("dist/pushit/{{ pkg.name }}-dev.js", "build/{{ pkg.name }}.js"),
                    CopyRule::file(
                        "dist/pushit/{{ pkg.name }}-lib-dev.js",
                        "build/{{ pkg.name }}-lib.js",
                    ),
                    CopyRule::file(
                        "dist/pushit/{{ pkg.name }}-dev.css",
                        "build/{{ pkg.name }}.css",
                    ),
                ],
            }),
        ),
        Step::new(
            "copy:devJsUnbundled",
            StepKind::Copy(CopyFiles {
                files: vec![expand("**/*.js", "dist/pushit/js/", Some("build/js/src/"), false)],
            }),
        ),
        Step::new(
            "copy:assets",
            StepKind::Copy(CopyFiles {
                files: vec![
                    expand("src/assets/**/*", "dist/pushit/assets/", None, true),
                    expand("lib/fonts/**/*", "dist/pushit/fonts/", None, true),
                ],
            }),
        ),
        Step::new(
            "manifest:prd",
            StepKind::ManifestGenerate(ManifestGenerate {
                base_path: "dist".to_string(),
                src: strings(&["pushit/**/*"]),
                exclude: strings(&["pushit/assets", "pushit/fonts"]),
                dest: "dist/manifest.appcache".to_string(),
                timestamp: true,
                network: strings(&["*"]),
            }),
        ),
        replace(
            "replace:dev",
            &[("env", "dev"), ("suffix", "dev"), ("manifest", "")],
        ),
        replace(
            "replace:prd",
            &[
                ("env", "prd"),
                ("suffix", "{{ pkg.version }}"),
                ("manifest", " manifest=\"manifest.appcache\""),
            ],
        ),
        notify("notify:dev", "Development build successful."),
        notify("notify:prd", "Production build successful."),
    ]
}

/// Composite tasks of the pushit build
pub fn tasks() -> Vec<TaskConfig> {
    vec![
        TaskConfig::new(
            "src",
            &[
                "ngtemplates",
                "less",
                "jshint:src",
                "wrap:closure",
                "insertJsFiles:src",
                "concat:src",
                "concat:lib",
                "concat:css",
            ],
        ),
        TaskConfig::new(
            "srcJsUnbundled",
            &[
                "ngtemplates",
                "less",
                "jshint:src",
                "wrap:closure",
                "insertJsFiles:srcJsUnbundled",
                "concat:srcJsUnbundled",
                "concat:lib",
                "concat:css",
            ],
        ),
        TaskConfig::new(
            "dev",
            &["src", "replace:dev", "copy:dev", "copy:assets", "notify:dev"],
        ),
        TaskConfig::new(
            "devJsUnbundled",
            &[
                "srcJsUnbundled",
                "replace:dev",
                "copy:dev",
                "copy:devJsUnbundled",
                "copy:assets",
                "notify:dev",
            ],
        ),
        TaskConfig::new(
            "prd",
            &[
                "src",
                "replace:prd",
                "uglify",
                "mincss",
                "copy:assets",
                "manifest:prd",
                "notify:prd",
            ],
        ),
        TaskConfig::new(
            "deploy-local",
            &["clean", "wrap:localconf", "copy:configfile", "dev"],
        ),
        TaskConfig::new(
            "deploy-default",
            &["clean", "wrap:configfile", "copy:configfile", "dev"],
        ),
    ]
}

/// Watch bindings of the pushit build
pub fn watches() -> Vec<WatchConfig> {
    let files = strings(&["package.json", "src/**"]);
    vec![
        WatchConfig {
            name: "dev".to_string(),
            files: files.clone(),
            tasks: strings(&["dev"]),
        },
        WatchConfig {
            name: "devJsUnbundled".to_string(),
            files,
            tasks: strings(&["devJsUnbundled"]),
        },
    ]
}

/// The complete built-in configuration
pub fn pushit() -> BuildConfig {
    BuildConfig {
        name: "pushit".to_string(),
        package: "package.json".to_string(),
        banner: DEFAULT_BANNER.to_string(),
        targets: targets(),
        tasks: tasks(),
        watch: watches(),
        sites: vec![],
        tools: ToolsConfig::default(),
    }
}
