//! Build context - package metadata and placeholder rendering
//!
//! Every step that embeds the package name, version, author or build date
//! renders its strings against one `BuildContext`, built once per run.

use crate::core::error::ConfigError;
use chrono::{Datelike, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default banner prefixed to concatenated and minified artifacts
pub const DEFAULT_BANNER: &str = "/*! {{ pkg.name }} - v{{ pkg.version }} - {{ date }}\n\
* copyright (c) {{ year }} {{ pkg.author }}; all rights reserved */\n";

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}";

/// Author field of `package.json`, either `"Jane Doe"` or `{ "name": "Jane Doe" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Detailed { name: String },
}

impl Author {
    pub fn name(&self) -> &str {
        match self {
            Author::Name(name) => name,
            Author::Detailed { name } => name,
        }
    }
}

/// The subset of `package.json` the build needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub author: Option<Author>,
}

impl PackageInfo {
    /// Read package metadata from a `package.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Package {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Package {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(Author::name).unwrap_or("")
    }
}

/// Template context for one build invocation
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Package metadata
    pub package: PackageInfo,

    /// When the build started (local time)
    pub built_at: NaiveDateTime,

    /// Rendered banner text
    banner: String,
}

impl BuildContext {
    /// Create a context with the default banner
    pub fn new(package: PackageInfo, built_at: NaiveDateTime) -> Result<Self, ConfigError> {
        Self::with_banner(package, built_at, DEFAULT_BANNER)
    }

    /// Create a context, rendering `banner_template` once up front
    pub fn with_banner(
        package: PackageInfo,
        built_at: NaiveDateTime,
        banner_template: &str,
    ) -> Result<Self, ConfigError> {
        let mut context = Self {
            package,
            built_at,
            banner: String::new(),
        };
        context.banner = context.render(banner_template)?;
        Ok(context)
    }

    /// The rendered banner
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Build date as `YYYY-MM-DD`
    pub fn date(&self) -> String {
        self.built_at.format("%Y-%m-%d").to_string()
    }

    /// Variables available to `{{ key }}` placeholders
    pub fn rendering_variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("pkg.name".to_string(), self.package.name.clone());
        vars.insert("pkg.version".to_string(), self.package.version.clone());
        vars.insert("pkg.author".to_string(), self.package.author_name().to_string());
        vars.insert("date".to_string(), self.date());
        vars.insert("year".to_string(), self.built_at.year().to_string());
        vars
    }

    /// Replace `{{ key }}` placeholders. Unknown keys are an error.
    pub fn render(&self, template: &str) -> Result<String, ConfigError> {
        self.render_with(template, &HashMap::new())
    }

    /// Render with extra step-local variables, which shadow context variables
    pub fn render_with(
        &self,
        template: &str,
        extra: &HashMap<String, String>,
    ) -> Result<String, ConfigError> {
        let vars = self.rendering_variables();
        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;

        let placeholder = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        for captures in placeholder.captures_iter(template) {
            let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = extra
                .get(key.as_str())
                .or_else(|| vars.get(key.as_str()))
                .ok_or_else(|| ConfigError::UnknownPlaceholder {
                    placeholder: key.as_str().to_string(),
                    template: template.to_string(),
                })?;
            rendered.push_str(&template[last..whole.start()]);
            rendered.push_str(value);
            last = whole.end();
        }
        rendered.push_str(&template[last..]);

        Ok(rendered)
    }
}
