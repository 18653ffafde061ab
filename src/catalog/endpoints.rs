use std::path::Path;

use ahash::AHashMap;
use anyhow::Context;

/// Technology name -> critical endpoints, in the order they were declared.
#[derive(Debug, Clone, Default)]
pub struct EndpointCatalog {
    order: Vec<String>,
    endpoints: AHashMap<String, Vec<String>>,
}

impl EndpointCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `endpoint` to the list of `technology`. Duplicates are kept.
    pub fn add(&mut self, technology: &str, endpoint: &str) {
        match self.endpoints.get_mut(technology) {
            Some(list) => list.push(endpoint.to_string()),
            None => {
                self.order.push(technology.to_string());
                self.endpoints.insert(technology.to_string(), vec![endpoint.to_string()]);
            }
        }
    }

    /// Endpoints mapped to `technology`; empty when it is unknown.
    pub fn endpoints_for(&self, technology: &str) -> &[String] {
        self.endpoints.get(technology).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Technology names in first-seen order.
    pub fn technologies(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<T, E> FromIterator<(T, E)> for EndpointCatalog
where
    T: AsRef<str>,
    E: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (T, E)>>(iter: I) -> Self {
        let mut catalog = EndpointCatalog::new();
        for (tech, endpoint) in iter {
            catalog.add(tech.as_ref(), endpoint.as_ref());
        }
        catalog
    }
}

/// Parse lines of the form `<endpoint> <tech1,tech2,...>`.
pub fn parse_endpoint_list(content: &str) -> EndpointCatalog {
    let mut catalog = EndpointCatalog::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(endpoint), Some(technologies)) = (parts.next(), parts.next()) else {
            tracing::warn!(line = idx + 1, entry=%line, "endpoint entry has no technology list, skipping");
            continue;
        };

        for tech in technologies.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            catalog.add(tech, endpoint);
        }
    }

    catalog
}

pub fn load_endpoint_catalog(path: &Path) -> anyhow::Result<EndpointCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read endpoint list {}", path.display()))?;
    Ok(parse_endpoint_list(&content))
}
