//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};

pub mod commands;
pub mod prompt;

/// flagctl - manage feature flags and rollout rules from the terminal
#[derive(Parser, Debug)]
#[command(name = "flagctl", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project key
    #[arg(long, global = true, env = "FLAGCTL_PROJECT")]
    pub project: Option<String>,

    /// Service base URL
    #[arg(long, global = true, env = "FLAGCTL_BASE_URL")]
    pub base_url: Option<String>,

    /// Output as JSON (for scripting)
    #[arg(long, alias = "robot", global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a feature flag (variations, per-environment state, rules)
    Get {
        /// Flag key
        flag_key: String,
    },

    /// List the project's environments
    Environments,

    /// Show a flag's evaluation status
    Status {
        /// Flag key
        flag_key: String,

        /// Environment key (omit for the cross-environment view)
        #[arg(short, long)]
        environment: Option<String>,
    },

    /// Add a percentage-rollout targeting rule to a flag
    AddRule(AddRuleArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Arguments for `add-rule`.
#[derive(Args, Debug)]
pub struct AddRuleArgs {
    /// Rule name (becomes the rule description)
    pub name: String,

    /// Endpoint pattern the rule matches, e.g. "GET /api/v1/users"
    pub pattern: String,

    /// Flag key to add the rule to
    #[arg(short, long, env = "FLAGCTL_FLAG")]
    pub flag: String,

    /// Target environment key
    #[arg(short, long, env = "FLAGCTL_ENVIRONMENT")]
    pub environment: String,

    /// Rollout percentages for the first and second variation
    #[arg(long, value_delimiter = ',', default_value = "50,50",
          value_parser = clap::value_parser!(u32).range(0..=100))]
    pub percentages: Vec<u32>,

    /// Context attribute used for rollout bucketing
    #[arg(long, default_value = "key")]
    pub bucket_by: String,

    /// Context kind for the clause and rollout
    #[arg(long, default_value = "request")]
    pub context_kind: String,

    /// Zero-based insertion position in the environment's rule list
    #[arg(long, default_value_t = 0)]
    pub position: usize,

    /// Audit comment attached to the change
    #[arg(long)]
    pub comment: Option<String>,

    /// Track evaluation events for this rule
    #[arg(long)]
    pub track_events: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes", alias = "force")]
    pub yes: bool,

    /// Replace the full rule list with a raw document patch instead of
    /// sending a semantic instruction
    #[arg(long)]
    pub use_document_patch: bool,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_rule_defaults() {
        let cli = Cli::parse_from([
            "flagctl", "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "api-v2-rollout", "--environment", "production",
        ]);
        let Commands::AddRule(args) = cli.command else {
            panic!("expected add-rule");
        };
        assert_eq!(args.percentages, vec![50, 50]);
        assert_eq!(args.bucket_by, "key");
        assert_eq!(args.context_kind, "request");
        assert_eq!(args.position, 0);
        assert!(!args.use_document_patch);
        assert!(!args.yes);
    }

    #[test]
    fn test_percentages_parse_comma_separated() {
        let cli = Cli::parse_from([
            "flagctl", "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "f", "--environment", "production",
            "--percentages", "80,20",
        ]);
        let Commands::AddRule(args) = cli.command else {
            panic!("expected add-rule");
        };
        assert_eq!(args.percentages, vec![80, 20]);
    }

    #[test]
    fn test_negative_position_is_rejected_at_parse() {
        let result = Cli::try_parse_from([
            "flagctl", "add-rule", "Users API", "GET /api/v1/users",
            "--flag", "f", "--environment", "production",
            "--position", "-1",
        ]);
        assert!(result.is_err());
    }
}
