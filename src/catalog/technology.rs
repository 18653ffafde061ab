use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// HTTP request issued for one rule. Defaults are filled in at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRequest {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_endpoint() -> String {
    "/".to_string()
}

impl Default for RuleRequest {
    fn default() -> Self {
        Self {
            method: default_method(),
            endpoint: default_endpoint(),
            headers: HashMap::new(),
        }
    }
}

impl RuleRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), ..Self::default() }
    }
}

/// What a response must look like for a rule to hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResponse {
    #[serde(
        default,
        alias = "code",
        alias = "statusCode",
        deserialize_with = "deserialize_status_code"
    )]
    pub status_code: Option<u16>,
    /// Exact-match subset; keys are compared as written.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, alias = "body", alias = "bodyPattern")]
    pub body_pattern: Option<BodyPattern>,
}

impl ExpectedResponse {
    pub fn status(code: u16) -> Self {
        Self { status_code: Some(code), ..Self::default() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, pattern: impl Into<String>) -> Self {
        self.body_pattern = Some(BodyPattern::new(pattern));
        self
    }
}

/// Body regex compiled once when the rule is built. An empty pattern matches
/// every body; one that fails to compile matches none.
#[derive(Debug, Clone)]
pub struct BodyPattern {
    source: String,
    compiled: Result<Regex, String>,
}

impl BodyPattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source).map_err(|e| e.to_string());
        Self { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compile error, if the pattern is not a valid regex.
    pub fn error(&self) -> Option<&str> {
        self.compiled.as_ref().err().map(String::as_str)
    }

    pub fn is_match(&self, body: &str) -> bool {
        if self.source.is_empty() {
            return true;
        }
        match &self.compiled {
            Ok(re) => re.is_match(body),
            Err(_) => false,
        }
    }
}

impl PartialEq for BodyPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for BodyPattern {}

impl Serialize for BodyPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for BodyPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(BodyPattern::new)
    }
}

/// Signature documents write the code either as a number or as a string.
fn deserialize_status_code<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCode {
        Number(u16),
        Text(String),
    }

    match Option::<RawCode>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCode::Number(n)) => Ok(Some(n)),
        Some(RawCode::Text(s)) => s
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid status code {:?}", s))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub request: RuleRequest,
    #[serde(default)]
    pub response: ExpectedResponse,
}

impl Rule {
    pub fn new(request: RuleRequest, response: ExpectedResponse) -> Self {
        Self { request, response }
    }
}

/// Rule names are kept in declaration order; the order of the required fold
/// matters when `required` and `optional` overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

impl Condition {
    pub fn required<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { required: names.into_iter().map(Into::into).collect(), optional: Vec::new() }
    }

    pub fn optional<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { required: Vec::new(), optional: names.into_iter().map(Into::into).collect() }
    }

    pub fn with_optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional = names.into_iter().map(Into::into).collect();
        self
    }

    /// Every rule name the condition refers to.
    pub fn referenced(&self) -> BTreeSet<&str> {
        self.required.iter().chain(self.optional.iter()).map(String::as_str).collect()
    }
}

/// On-disk shape of a technology document; the name comes from the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TechnologyDocument {
    #[serde(default)]
    pub rules: HashMap<String, Rule>,
    #[serde(default)]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnologyDefinition {
    pub name: String,
    pub rules: HashMap<String, Rule>,
    pub condition: Condition,
}

impl TechnologyDefinition {
    pub fn new(name: impl Into<String>, rules: HashMap<String, Rule>, condition: Condition) -> Self {
        Self { name: name.into(), rules, condition }
    }

    pub fn from_document(name: impl Into<String>, doc: TechnologyDocument) -> Self {
        Self::new(name, doc.rules, doc.condition.unwrap_or_default())
    }

    /// `(rule, error)` for every body pattern that failed to compile.
    pub fn invalid_patterns(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .rules
            .iter()
            .filter_map(|(name, rule)| {
                let err = rule.response.body_pattern.as_ref()?.error()?;
                Some((name.as_str(), err))
            })
            .collect();
        out.sort();
        out
    }

    /// Condition entries that name no rule. They evaluate to `false`.
    pub fn dangling_references(&self) -> Vec<&str> {
        self.condition
            .referenced()
            .into_iter()
            .filter(|name| !self.rules.contains_key(*name))
            .collect()
    }
}

/// Read-only set of technology definitions shared by every probe of a run.
#[derive(Debug, Clone, Default)]
pub struct TechnologyCatalog {
    technologies: Vec<TechnologyDefinition>,
}

impl TechnologyCatalog {
    pub fn new(technologies: Vec<TechnologyDefinition>) -> Self {
        Self { technologies }
    }

    pub fn technologies(&self) -> &[TechnologyDefinition] {
        &self.technologies
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&TechnologyDefinition> {
        self.technologies.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }
}
