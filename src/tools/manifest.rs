//! Offline cache manifest rendering

use chrono::NaiveDateTime;

/// True when `path` equals one of the prefixes or lies below one
pub fn is_excluded(path: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Render an application cache manifest.
///
/// `entries` are sorted; `time` adds a `# Time:` comment line so each build
/// invalidates client caches.
pub fn render(entries: &[String], network: &[String], time: Option<NaiveDateTime>) -> String {
    let mut sorted: Vec<&String> = entries.iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut out = String::from("CACHE MANIFEST\n");
    if let Some(time) = time {
        out.push_str(&format!("# Time: {}\n", time.format("%Y-%m-%d %H:%M:%S")));
    }

    out.push_str("\nCACHE:\n");
    for entry in sorted {
        out.push_str(entry);
        out.push('\n');
    }

    if !network.is_empty() {
        out.push_str("\nNETWORK:\n");
        for entry in network {
            out.push_str(entry);
            out.push('\n');
        }
    }

    out
}
