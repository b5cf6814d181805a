//! Status command implementation.

use colored::Colorize;

use crate::api::{ApiClient, FlagGateway};
use crate::config::Settings;
use crate::error::{Error, Result};

/// Execute the status command.
///
/// With `--environment` the status is environment-scoped; without it
/// the service aggregates across environments.
pub fn execute(
    flag_key: &str,
    environment: Option<&str>,
    base_url: Option<&str>,
    project: Option<&str>,
    json: bool,
) -> Result<()> {
    let settings = Settings::resolve(base_url, project)?;
    let client = ApiClient::new(&settings.base_url, &settings.api_key);

    let rt = tokio::runtime::Runtime::new()?;
    let status = rt
        .block_on(client.get_flag_status(&settings.project, flag_key, environment))?
        .ok_or_else(|| Error::StatusNotFound { key: flag_key.to_string() })?;

    if json {
        println!("{}", serde_json::to_string(&status)?);
        return Ok(());
    }

    println!("{} status: {}", flag_key.bold(), status.name);
    if let Some(env) = environment {
        println!("Environment:    {env}");
    }
    match status.last_requested {
        Some(ts) => println!("Last requested: {}", ts.to_rfc3339()),
        None => println!("Last requested: never"),
    }
    if let Some(default) = &status.default {
        println!("Default value:  {default}");
    }
    Ok(())
}
