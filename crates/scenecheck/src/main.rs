//! SceneCheck CLI binary.
//!
//! - Validate a project document and render the report
//! - Watch a scene directory and re-validate on change
//! - List the effective rule set

use clap::Parser;
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, list_rules, retry_exit_code, run_validation, run_watch};

    // Load .env for GEMINI_API_KEY
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let directives = if cli.verbose {
        "debug"
    } else {
        "warn,scenecheck=info"
    };
    scenecheck::init_tracing_with_default(cli.log_json, directives).map_err(|e| e.to_string())?;

    let outcome = match cli.command {
        Commands::Validate(args) => run_validation(args).await,
        Commands::Watch(args) => run_watch(args).await,
        Commands::Rules { rules } => list_rules(rules.as_deref())
            .map(|()| ExitCode::SUCCESS)
            .map_err(Into::into),
    };

    outcome.or_else(|err| match retry_exit_code(err.as_ref()) {
        Some(code) => {
            eprintln!("Error: {err}\nThe failure is temporary; run the command again.");
            Ok(ExitCode::from(code))
        }
        None => Err(err),
    })
}
