//! flagctl CLI entry point.

use clap::Parser;
use flagctl::cli::commands;
use flagctl::cli::{Cli, Commands};
use flagctl::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Cancelled) => {
            if !cli.quiet && !json {
                eprintln!("Cancelled.");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let base_url = cli.base_url.as_deref();
    let project = cli.project.as_deref();

    match &cli.command {
        Commands::Get { flag_key } => commands::get::execute(flag_key, base_url, project, json),

        Commands::Environments => commands::environments::execute(base_url, project, json),

        Commands::Status { flag_key, environment } => {
            commands::status::execute(flag_key, environment.as_deref(), base_url, project, json)
        }

        Commands::AddRule(args) => commands::add_rule::execute(args, base_url, project, json),

        Commands::Completions { shell } => commands::completions::execute(shell),

        Commands::Version => commands::version::execute(json),
    }
}
