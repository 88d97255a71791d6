//! Validation command handler.

use super::ValidateArgs;
use scenecheck::{ReportRenderer, SceneCheckConfig, Validator, load_project_file};
use std::process::ExitCode;
use tracing::{info, instrument};

/// Load configuration and the project, validate, and write the report.
///
/// Exits with failure when the report contains errors.
#[instrument(skip_all, fields(project = %args.project.display()))]
pub async fn run_validation(args: ValidateArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = SceneCheckConfig::load_with(args.rules.as_deref())?;
    apply_overrides(&mut config, &args);

    let project = load_project_file(&args.project, config.project.tie_policy)?;
    let snapshot = project.snapshot()?;
    let validator = Validator::from_config(&config)?;
    let report = validator.validate(&snapshot, &config.validation).await;

    let format = args.format.unwrap_or(config.report.format);
    let rendered = ReportRenderer::render(&report, format)?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            info!(path = %path.display(), %format, "Wrote report");
        }
        None => println!("{}", rendered),
    }

    eprintln!(
        "{} error(s), {} warning(s), {} info across {} scene(s)",
        report.summary().errors(),
        report.summary().warnings(),
        report.summary().infos(),
        report.summary().scenes_checked()
    );

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn apply_overrides(config: &mut SceneCheckConfig, args: &ValidateArgs) {
    let mut options = config.validation.clone();
    if let Some(strict) = args.strict_ordering {
        options = options.with_strict_ordering(strict);
    }
    if args.semantic {
        options = options.with_semantic_analysis_enabled(true);
    }
    config.validation = options;
}
