//! Built-in style compiler fallback
//!
//! Handles the part of LESS that plain style sheets rely on most: top-level
//! `@name: value;` variables. Declarations are removed and references are
//! replaced; every other construct passes through unchanged. Projects that
//! use mixins or nesting configure an external compiler instead.

use regex::{Captures, Regex};
use std::collections::HashMap;

const DECLARATION: &str = r"(?m)^[ \t]*@([A-Za-z0-9_-]+)[ \t]*:[ \t]*([^;\n]+);[ \t]*\r?\n?";
const REFERENCE: &str = r"@([A-Za-z0-9_-]+)";

/// Compile a style sheet
pub fn compile(source: &str) -> Result<String, String> {
    let declaration = Regex::new(DECLARATION).map_err(|e| e.to_string())?;
    let reference = Regex::new(REFERENCE).map_err(|e| e.to_string())?;

    let mut variables: HashMap<String, String> = HashMap::new();
    for captures in declaration.captures_iter(source) {
        // Values may refer to earlier variables
        let value = substitute(&reference, captures[2].trim(), &variables);
        variables.insert(captures[1].to_string(), value);
    }

    let body = declaration.replace_all(source, "");
    Ok(substitute(&reference, &body, &variables))
}

fn substitute(reference: &Regex, text: &str, variables: &HashMap<String, String>) -> String {
    reference
        .replace_all(text, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
