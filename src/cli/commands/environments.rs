//! Environments command implementation.

use crate::api::{ApiClient, FlagGateway};
use crate::config::Settings;
use crate::error::Result;

/// Execute the environments command: list the project's environments.
pub fn execute(base_url: Option<&str>, project: Option<&str>, json: bool) -> Result<()> {
    let settings = Settings::resolve(base_url, project)?;
    let client = ApiClient::new(&settings.base_url, &settings.api_key);

    let rt = tokio::runtime::Runtime::new()?;
    let environments = rt.block_on(client.get_project_environments(&settings.project))?;

    if json {
        println!("{}", serde_json::to_string(&environments)?);
        return Ok(());
    }

    if environments.is_empty() {
        println!("No environments in project '{}'.", settings.project);
        return Ok(());
    }

    println!("Environments in '{}':", settings.project);
    for env in &environments {
        println!("  {:<20} {}", env.key, env.name);
    }
    Ok(())
}
