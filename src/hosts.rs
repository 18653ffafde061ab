use std::path::Path;

use anyhow::Context;

/// Reduce an entry to a bare hostname. A pasted URL keeps only its host
/// (and port). Blank entries yield `None`.
pub fn normalize_host(entry: &str) -> Option<String> {
    let entry = entry.trim();
    if entry.is_empty() || entry.starts_with('#') {
        return None;
    }

    if entry.starts_with("http://") || entry.starts_with("https://") {
        let parsed = url::Url::parse(entry).ok()?;
        let host = parsed.host_str()?;
        return Some(match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        });
    }

    let host = entry.split('/').next().unwrap_or("").trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

pub fn parse_host_list(content: &str) -> Vec<String> {
    content.lines().filter_map(normalize_host).collect()
}

/// A target is either a file of hostnames or a single hostname.
pub fn resolve_targets(target: &str) -> anyhow::Result<Vec<String>> {
    let path = Path::new(target);
    if path.is_file() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read host list {}", path.display()))?;
        return Ok(parse_host_list(&content));
    }
    Ok(normalize_host(target).into_iter().collect())
}
