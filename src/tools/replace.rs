//! `@@key` variable substitution

use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Replace `<prefix>key` occurrences with their values. Unknown keys stay.
pub fn substitute(
    content: &str,
    prefix: &str,
    variables: &BTreeMap<String, String>,
) -> Result<String, regex::Error> {
    let pattern = Regex::new(&format!("{}([A-Za-z0-9_]+)", regex::escape(prefix)))?;
    let replaced = pattern.replace_all(content, |caps: &Captures| match variables.get(&caps[1]) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    });
    Ok(replaced.into_owned())
}
