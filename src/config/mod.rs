//! Configuration resolution.
//!
//! Everything the client needs to talk to the service: base URL, access
//! token, project key. Each value resolves through a small priority
//! ladder (explicit flag → environment variable → default or error).
//! The access token is env-only so it never appears in argv or shell
//! history.

use crate::error::{Error, Result};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://app.launchdarkly.com";

/// Environment variable holding the service access token.
pub const API_KEY_ENV: &str = "FLAGCTL_API_KEY";

/// Resolved connection settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub project: String,
}

impl Settings {
    /// Resolve settings from CLI flags and the environment.
    ///
    /// `base_url` and `project` come in with clap's env fallback already
    /// applied (`FLAGCTL_BASE_URL`, `FLAGCTL_PROJECT`).
    ///
    /// # Errors
    ///
    /// Fails if the project key is missing/empty or the API key is unset.
    pub fn resolve(base_url: Option<&str>, project: Option<&str>) -> Result<Self> {
        let project = project
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::RequiredField(
                    "project key (use --project or FLAGCTL_PROJECT)".to_string(),
                )
            })?;

        let base_url = base_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);

        Ok(Self {
            base_url: base_url.to_string(),
            api_key: resolve_api_key()?,
            project: project.to_string(),
        })
    }
}

/// Read the access token from the environment.
fn resolve_api_key() -> Result<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(Error::Config(format!("API key not set ({API_KEY_ENV})"))),
    }
}
