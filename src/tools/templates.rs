//! Angular template cache generation

use serde_json::Value;

/// One template: its URL and markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub url: String,
    pub html: String,
}

/// Render a `$templateCache` registration script for `module`
pub fn render(module: &str, templates: &[Template]) -> String {
    let mut out = format!(
        "angular.module('{}').run(['$templateCache', function($templateCache) {{\n  'use strict';\n\n",
        escape_single(module)
    );

    for template in templates {
        // serde_json emits a valid JavaScript string literal
        let html = Value::String(template.html.clone()).to_string();
        out.push_str(&format!(
            "  $templateCache.put('{}',\n    {}\n  );\n\n",
            escape_single(&template.url),
            html
        ));
    }

    out.push_str("}]);\n");
    out
}

fn escape_single(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
