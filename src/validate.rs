//! Input validation for rule parameters.
//!
//! Everything here runs before any network call: bad percentages or a
//! malformed endpoint pattern never reach the service.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// An endpoint pattern is an uppercase HTTP method token, whitespace,
/// then a path starting with `/`.
static ENDPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(GET|POST|PUT|DELETE|PATCH|OPTIONS|HEAD)\s+/\S*$")
        .expect("endpoint pattern regex is valid")
});

/// Validate that the two rollout percentages sum to exactly 100.
pub fn validate_percentages(percentages: [u32; 2]) -> Result<()> {
    let [p0, p1] = percentages;
    if p0 + p1 == 100 {
        Ok(())
    } else {
        Err(Error::InvalidPercentages { p0, p1 })
    }
}

/// Validate the method+path endpoint pattern format.
pub fn validate_endpoint_pattern(pattern: &str) -> Result<()> {
    if ENDPOINT_PATTERN.is_match(pattern) {
        Ok(())
    } else {
        Err(Error::InvalidPattern { pattern: pattern.to_string() })
    }
}

/// Reject empty or whitespace-only required keys (project, environment).
pub fn require_key(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::RequiredField(format!("{name} must not be empty")))
    } else {
        Ok(())
    }
}
