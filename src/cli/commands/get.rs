//! Get command implementation.

use colored::Colorize;

use crate::api::types::FlagDocument;
use crate::api::{ApiClient, FlagGateway};
use crate::config::Settings;
use crate::error::{Error, Result};

/// Execute the get command: fetch and display one flag.
pub fn execute(
    flag_key: &str,
    base_url: Option<&str>,
    project: Option<&str>,
    json: bool,
) -> Result<()> {
    let settings = Settings::resolve(base_url, project)?;
    let client = ApiClient::new(&settings.base_url, &settings.api_key);

    let rt = tokio::runtime::Runtime::new()?;
    let flag = rt
        .block_on(client.get_flag_details(&settings.project, flag_key))?
        .ok_or_else(|| Error::FlagNotFound { key: flag_key.to_string() })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&flag)?);
        return Ok(());
    }

    render_flag(&flag);
    Ok(())
}

fn render_flag(flag: &FlagDocument) {
    println!("{} ({})", flag.name.bold(), flag.key);
    if let Some(kind) = &flag.kind {
        println!("Kind: {kind}");
    }
    if let Some(description) = &flag.description {
        println!("{description}");
    }
    if !flag.tags.is_empty() {
        println!("Tags: {}", flag.tags.join(", "));
    }

    println!();
    println!("Variations:");
    for (i, variation) in flag.variations.iter().enumerate() {
        let name = variation.name.as_deref().unwrap_or("");
        println!("  [{i}] {name}: {}", variation.value);
    }

    println!();
    println!("Environments:");
    for (key, config) in &flag.environments {
        let state = if config.on { "on".green() } else { "off".red() };
        println!("  {key:<16} {state}  {} rule(s)", config.rules.len());
        for rule in &config.rules {
            let kind = if rule.rollout.is_some() { "rollout" } else { "fixed" };
            println!("    - {} ({kind})", rule.description);
        }
    }
}
