//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use scenecheck::ReportFormat;
use std::path::PathBuf;

/// SceneCheck - continuity validation for scene timelines
#[derive(Parser, Debug)]
#[command(name = "scenecheck")]
#[command(about = "Continuity validation for ordered scene collections", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a project document and render the report
    Validate(ValidateArgs),

    /// Watch a scene directory and re-validate whenever scene files change
    Watch(WatchArgs),

    /// List the effective rule set
    Rules {
        /// Configuration file with rule definitions layered over the defaults
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

/// Arguments of `scenecheck validate`
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the project JSON document
    pub project: PathBuf,

    /// Configuration file with rule definitions layered over the defaults
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Output format (json, html, markdown)
    #[arg(long)]
    pub format: Option<ReportFormat>,

    /// Write the report here instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report timestamps that go backwards (pass `false` to disable)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub strict_ordering: Option<bool>,

    /// Run semantic analysis (requires GEMINI_API_KEY)
    #[arg(long)]
    pub semantic: bool,
}

/// Arguments of `scenecheck watch`
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Directory holding one scene JSON document per file
    pub scenes: PathBuf,

    /// Project JSON document with the entity vocabulary and any initial scenes
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Configuration file with rule definitions layered over the defaults
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Output format (json, html, markdown)
    #[arg(long)]
    pub format: Option<ReportFormat>,

    /// Directory reports are written to
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Rescan period in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Apply the current files, validate once and exit
    #[arg(long)]
    pub once: bool,

    /// Run semantic analysis (requires GEMINI_API_KEY)
    #[arg(long)]
    pub semantic: bool,
}
