use std::path::{Path, PathBuf};

use anyhow::Context;

use super::technology::{TechnologyCatalog, TechnologyDefinition, TechnologyDocument};

/// Parse one technology document. The name is supplied by the caller (file stem).
pub fn parse_technology(name: &str, content: &str) -> anyhow::Result<TechnologyDefinition> {
    let doc: TechnologyDocument = serde_yaml::from_str(content)
        .with_context(|| format!("malformed definition for technology {}", name))?;
    Ok(TechnologyDefinition::from_document(name, doc))
}

pub fn load_technology_file(name: &str, path: &Path) -> anyhow::Result<TechnologyDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_technology(name, &content)
}

/// Load `<dir>/<name>.yaml` for each name, or every YAML file in `dir` when
/// `names` is empty. Broken entries are logged and left out of the catalog.
pub fn load_catalog(dir: &Path, names: &[String]) -> anyhow::Result<TechnologyCatalog> {
    let entries: Vec<(String, PathBuf)> = if names.is_empty() {
        discover_definitions(dir)?
    } else {
        names
            .iter()
            .map(|n| (n.clone(), resolve_definition_path(dir, n)))
            .collect()
    };

    let mut technologies = Vec::with_capacity(entries.len());
    for (name, path) in entries {
        match load_technology_file(&name, &path) {
            Ok(tech) => {
                let dangling = tech.dangling_references();
                if !dangling.is_empty() {
                    tracing::warn!(technology=%name, rules=?dangling, "condition references unknown rules; they count as false");
                }
                for (rule, err) in tech.invalid_patterns() {
                    tracing::warn!(technology=%name, rule=%rule, "invalid body pattern, rule can never match: {}", err);
                }
                tracing::debug!(technology=%name, rules = tech.rules.len(), "loaded technology definition");
                technologies.push(tech);
            }
            Err(e) => {
                tracing::warn!(technology=%name, "skipping technology: {:#}", e);
            }
        }
    }

    Ok(TechnologyCatalog::new(technologies))
}

fn resolve_definition_path(dir: &Path, name: &str) -> PathBuf {
    let yaml = dir.join(format!("{}.yaml", name));
    if yaml.exists() {
        return yaml;
    }
    let yml = dir.join(format!("{}.yml", name));
    if yml.exists() {
        yml
    } else {
        yaml
    }
}

fn discover_definitions(dir: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let read = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read technology directory {}", dir.display()))?;

    let mut out: Vec<(String, PathBuf)> = read.filter_map(definition_entry).collect();
    // read_dir order is platform dependent
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// `(name, path)` for a YAML definition file. Unreadable entries are logged and skipped.
fn definition_entry(entry: std::io::Result<std::fs::DirEntry>) -> Option<(String, PathBuf)> {
    let path = match entry {
        Ok(e) => e.path(),
        Err(e) => {
            tracing::warn!("skipping unreadable directory entry: {}", e);
            return None;
        }
    };
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if !is_yaml || !path.is_file() {
        return None;
    }
    let stem = path.file_stem().and_then(|s| s.to_str())?.to_string();
    Some((stem, path))
}
