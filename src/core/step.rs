//! Step domain model
//!
//! A step is one declared file transformation. Each kind carries its own
//! named options; there is no free-form option bag.

use crate::core::filter::PathFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named leaf step (`kind:target`, e.g. `concat:src`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique step name
    pub name: String,

    /// What the step does
    #[serde(flatten)]
    pub kind: StepKind,
}

impl Step {
    pub fn new(name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The part of the name before the colon (`concat` for `concat:src`)
    pub fn family(&self) -> &str {
        self.name.split(':').next().unwrap_or(&self.name)
    }
}

/// The transformation a step performs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StepKind {
    TemplateCompile(TemplateCompile),
    StyleCompile(StyleCompile),
    Lint(Lint),
    NamespaceWrap(NamespaceWrap),
    ModuleWrap(ModuleWrap),
    ReferenceInject(ReferenceInject),
    Concatenate(Concatenate),
    Minify(Minify),
    Copy(CopyFiles),
    ManifestGenerate(ManifestGenerate),
    VariableSubstitute(VariableSubstitute),
    RemoteUpload(RemoteUpload),
    Clean(Clean),
    Notify(Notify),
}

impl StepKind {
    /// Human-readable kind label
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::TemplateCompile(_) => "template-compile",
            StepKind::StyleCompile(_) => "style-compile",
            StepKind::Lint(_) => "lint",
            StepKind::NamespaceWrap(_) => "namespace-wrap",
            StepKind::ModuleWrap(_) => "module-wrap",
            StepKind::ReferenceInject(_) => "reference-inject",
            StepKind::Concatenate(_) => "concatenate",
            StepKind::Minify(_) => "minify",
            StepKind::Copy(_) => "copy",
            StepKind::ManifestGenerate(_) => "manifest-generate",
            StepKind::VariableSubstitute(_) => "variable-substitute",
            StepKind::RemoteUpload(_) => "remote-upload",
            StepKind::Clean(_) => "clean",
            StepKind::Notify(_) => "notify",
        }
    }
}

/// Inline HTML templates into an Angular `$templateCache` script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCompile {
    pub src: Vec<String>,
    pub dest: String,
    /// Prefix stripped from file paths to form template URLs
    #[serde(default)]
    pub base: Option<String>,
    /// Angular module the templates register with
    pub module: String,
}

/// Compile style sheets, one output per input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleCompile {
    pub src: Vec<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    /// Output directory
    pub dest: String,
    #[serde(default = "default_css_ext")]
    pub ext: String,
    #[serde(default)]
    pub filter: Option<PathFilter>,
}

/// Check scripts for structural errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lint {
    pub src: Vec<String>,
    #[serde(default)]
    pub filter: Option<PathFilter>,
    /// Report problems without failing the step
    #[serde(default)]
    pub force: bool,
}

/// Surround each file with fixed text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceWrap {
    pub src: Vec<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    /// Output directory; each file keeps its source path below it
    pub dest: String,
    /// Rendered per file; `{{ file }}` and `{{ module }}` name the source
    pub before: String,
    pub after: String,
    #[serde(default)]
    pub filter: Option<PathFilter>,
}

/// Wrap each file as a CommonJS module definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleWrap {
    pub src: Vec<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    pub dest: String,
    #[serde(default)]
    pub filter: Option<PathFilter>,
}

/// Insert `<script>` references into a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceInject {
    pub src: String,
    pub dest: String,
    #[serde(default)]
    pub js_base_dir: Option<String>,
    #[serde(default)]
    pub js_files: Option<String>,
    #[serde(default)]
    pub append_path: String,
}

/// Join files into one artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concatenate {
    pub src: Vec<String>,
    pub dest: String,
    /// Prefix the output with the build banner
    #[serde(default)]
    pub banner: bool,
    /// Drop a leading `/* ... */` comment from each input (`/*!` comments stay)
    #[serde(default)]
    pub strip_banners: bool,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Write a banner-only file when nothing matches instead of failing
    #[serde(default)]
    pub allow_empty: bool,
}

/// Language handled by a minify step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Script,
    Style,
}

/// A single `dest <- src` file pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapping {
    pub dest: String,
    pub src: String,
}

impl FileMapping {
    pub fn new(dest: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            src: src.into(),
        }
    }
}

/// Minify scripts or style sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minify {
    pub language: Language,
    pub files: Vec<FileMapping>,
    #[serde(default)]
    pub banner: bool,
}

/// One copy rule
///
/// Without `expand`, every matched file is copied to `dest` itself (the last
/// match wins). With `expand`, `dest` is a directory and each file keeps its
/// path relative to `cwd`, or only its file name when `flatten` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyRule {
    pub src: Vec<String>,
    pub dest: String,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub expand: bool,
    #[serde(default)]
    pub flatten: bool,
    #[serde(default)]
    pub filter: Option<PathFilter>,
}

impl CopyRule {
    /// Copy matches of `src` onto the single file `dest`
    pub fn file(dest: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            src: vec![src.into()],
            dest: dest.into(),
            cwd: None,
            expand: false,
            flatten: false,
            filter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyFiles {
    pub files: Vec<CopyRule>,
}

/// Generate an offline cache manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestGenerate {
    /// Directory manifest entries are relative to
    pub base_path: String,
    pub src: Vec<String>,
    /// Path prefixes (relative to `base_path`) left out of the manifest
    #[serde(default)]
    pub exclude: Vec<String>,
    pub dest: String,
    #[serde(default)]
    pub timestamp: bool,
    #[serde(default = "default_network")]
    pub network: Vec<String>,
}

/// Replace `@@key` placeholders in a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSubstitute {
    pub src: String,
    pub dest: String,
    #[serde(default = "default_replace_prefix")]
    pub prefix: String,
    pub variables: BTreeMap<String, String>,
}

/// A `local glob -> remote prefix` upload pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMapping {
    pub src: String,
    pub dest: String,
}

/// Upload build output to a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUpload {
    pub bucket: String,
    #[serde(default = "default_access")]
    pub access: String,
    pub uploads: Vec<UploadMapping>,
}

impl RemoteUpload {
    /// Standard deployment of `dist/` to a site bucket
    pub fn site(fqdn: &str) -> Self {
        let upload = |src: &str, dest: &str| UploadMapping {
            src: src.to_string(),
            dest: dest.to_string(),
        };
        Self {
            bucket: fqdn.to_string(),
            access: default_access(),
            uploads: vec![
                upload("dist/*", "/"),
                upload("dist/pushit/*", "/pushit/"),
                upload("dist/pushit/assets/*", "/pushit/assets/"),
                upload("dist/pushit/fonts/*", "/pushit/fonts/"),
            ],
        }
    }
}

/// Remove previous outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clean {
    pub paths: Vec<String>,
}

/// Announce a finished build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notify {
    pub message: String,
}

fn default_css_ext() -> String {
    ".css".to_string()
}

fn default_separator() -> String {
    "\n".to_string()
}

fn default_network() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_replace_prefix() -> String {
    "@@".to_string()
}

fn default_access() -> String {
    "public-read".to_string()
}
