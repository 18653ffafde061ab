use std::collections::HashMap;

use crate::catalog::{BodyPattern, ExpectedResponse};
use crate::probe::ProbeResponse;

/// A rule holds when status, headers and body all agree with `expected`.
pub fn matches(response: &ProbeResponse, expected: &ExpectedResponse) -> bool {
    check_status(response.status, expected.status_code)
        && check_headers(&response.headers, &expected.headers)
        && check_body(&response.body, expected.body_pattern.as_ref())
}

/// No expected code means any status passes.
pub fn check_status(status: u16, expected: Option<u16>) -> bool {
    match expected {
        Some(code) => status == code,
        None => true,
    }
}

/// Keys are compared exactly as the signature spells them.
pub fn check_headers(actual: &HashMap<String, String>, expected: &HashMap<String, String>) -> bool {
    expected
        .iter()
        .all(|(name, value)| actual.get(name).is_some_and(|v| v == value))
}

/// Search the whole body for `pattern`. An empty or absent pattern matches
/// anything; a pattern that failed to compile matches nothing.
pub fn check_body(body: &str, pattern: Option<&BodyPattern>) -> bool {
    pattern.map_or(true, |p| p.is_match(body))
}
