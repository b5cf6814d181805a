//! Add-rule command implementation.
//!
//! Orchestrates the full flow: local validation → confirmation gate →
//! flag lookup and environment/variation checks → rule construction →
//! patch submission via the selected strategy.

use colored::Colorize;
use serde::Serialize;

use crate::api::{ApiClient, FlagGateway};
use crate::cli::prompt::{AutoConfirm, ConfirmPrompt, TerminalPrompt};
use crate::cli::AddRuleArgs;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::rules::{apply_rule, build_rollout_rule, PatchStrategy, RolloutRuleSpec};
use crate::validate;

/// Output for a successful add-rule invocation.
#[derive(Serialize)]
struct AddRuleOutput<'a> {
    flag: &'a str,
    environment: &'a str,
    rule: &'a str,
    pattern: &'a str,
    percentages: [u32; 2],
    position: usize,
    strategy: &'a str,
}

/// Execute the add-rule command.
///
/// All local validation happens before the confirmation prompt and
/// before any network call; declining the prompt exits 0.
pub fn execute(
    args: &AddRuleArgs,
    base_url: Option<&str>,
    project: Option<&str>,
    json: bool,
) -> Result<()> {
    let percentages = parse_percentages(&args.percentages)?;
    validate::validate_percentages(percentages)?;
    validate::validate_endpoint_pattern(&args.pattern)?;
    validate::require_key("flag key", &args.flag)?;
    validate::require_key("environment key", &args.environment)?;

    let settings = Settings::resolve(base_url, project)?;

    let strategy = if args.use_document_patch {
        PatchStrategy::Document
    } else {
        PatchStrategy::Semantic
    };

    if !json {
        print_preview(args, percentages, strategy);
    }

    // --yes swaps the terminal prompt for an auto-accept.
    let auto = AutoConfirm(true);
    let prompt: &dyn ConfirmPrompt = if args.yes { &auto } else { &TerminalPrompt };
    let confirmed = prompt.confirm(
        &format!(
            "Add rule '{}' to flag '{}' in {}?",
            args.name, args.flag, args.environment
        ),
        true,
    )?;
    if !confirmed {
        return Err(Error::Cancelled);
    }

    let client = ApiClient::new(&settings.base_url, &settings.api_key);
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(&client, &settings.project, args, percentages, strategy))?;

    if json {
        let output = AddRuleOutput {
            flag: &args.flag,
            environment: &args.environment,
            rule: &args.name,
            pattern: &args.pattern,
            percentages,
            position: args.position,
            strategy: strategy_name(strategy),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "{} rule '{}' added to '{}' in {}",
            "OK".green().bold(),
            args.name,
            args.flag,
            args.environment
        );
    }

    Ok(())
}

/// Fetch, validate against the live flag, build the rule, and submit it.
async fn run<G: FlagGateway>(
    gateway: &G,
    project_key: &str,
    args: &AddRuleArgs,
    percentages: [u32; 2],
    strategy: PatchStrategy,
) -> Result<()> {
    let flag = gateway
        .get_flag(project_key, &args.flag)
        .await?
        .ok_or_else(|| Error::FlagNotFound { key: args.flag.clone() })?;

    if !flag.environments.contains_key(&args.environment) {
        return Err(Error::EnvironmentNotFound {
            key: args.environment.clone(),
            available: flag.environment_keys(),
        });
    }

    if flag.variations.len() < 2 {
        return Err(Error::InsufficientVariations { found: flag.variations.len() });
    }

    let variation_refs = flag.variation_refs();
    let rule = build_rollout_rule(
        &RolloutRuleSpec {
            name: &args.name,
            endpoint_pattern: &args.pattern,
            percentages,
            bucket_by: &args.bucket_by,
            context_kind: &args.context_kind,
            track_events: args.track_events,
        },
        &variation_refs,
    );

    let ok = apply_rule(
        gateway,
        strategy,
        project_key,
        &args.flag,
        &args.environment,
        &rule,
        args.position,
        args.comment.as_deref(),
    )
    .await?;

    if ok {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "Failed to add rule '{}' to flag '{}'",
            args.name, args.flag
        )))
    }
}

fn parse_percentages(raw: &[u32]) -> Result<[u32; 2]> {
    match raw {
        [p0, p1] => Ok([*p0, *p1]),
        _ => Err(Error::InvalidArgument(format!(
            "expected exactly 2 percentages, got {}",
            raw.len()
        ))),
    }
}

fn print_preview(args: &AddRuleArgs, percentages: [u32; 2], strategy: PatchStrategy) {
    println!("{}", "Rule preview".bold());
    println!("  Flag:        {}", args.flag);
    println!("  Environment: {}", args.environment);
    println!("  Name:        {}", args.name);
    println!("  Clause:      endpoint_pattern matches \"{}\"", args.pattern);
    println!(
        "  Rollout:     {}% / {}% (bucket by '{}', context kind '{}')",
        percentages[0], percentages[1], args.bucket_by, args.context_kind
    );
    println!("  Position:    {}", args.position);
    println!("  Strategy:    {}", strategy_name(strategy));
}

const fn strategy_name(strategy: PatchStrategy) -> &'static str {
    match strategy {
        PatchStrategy::Semantic => "semantic",
        PatchStrategy::Document => "document",
    }
}
