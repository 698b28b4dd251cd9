//! Script wrapping

/// Surround `content` with fixed text
pub fn namespace(before: &str, content: &str, after: &str) -> String {
    let mut out = String::with_capacity(before.len() + content.len() + after.len());
    out.push_str(before);
    out.push_str(content);
    out.push_str(after);
    out
}

/// Module id for a path relative to the module root: `panes/home.js` -> `panes/home`
pub fn module_id(relative: &str) -> &str {
    let file_start = relative.rfind('/').map(|p| p + 1).unwrap_or(0);
    match relative[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &relative[..file_start + dot],
        _ => relative,
    }
}

/// Wrap `content` as a CommonJS module definition
pub fn commonjs(relative: &str, content: &str) -> String {
    let id = serde_json::Value::String(module_id(relative).to_string());
    format!(
        "this.require.define({{{}:function(exports, require, module){{\n{}\n;}}}});\n",
        id, content
    )
}
