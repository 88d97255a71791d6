//! Watch command handler.

use super::WatchArgs;
use scenecheck::{
    Project, ProjectHandle, SceneCheckConfig, SceneWatcher, Validator, load_project_file,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, instrument};

/// Keep a project in sync with a scene directory and re-validate on change.
///
/// With `--once` the current files are applied and validated a single time
/// and the exit status reflects the report.
#[instrument(skip_all, fields(scenes = %args.scenes.display()))]
pub async fn run_watch(args: WatchArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = SceneCheckConfig::load_with(args.rules.as_deref())?;
    if args.semantic {
        config.validation = config.validation.with_semantic_analysis_enabled(true);
    }

    let project = match &args.project {
        Some(path) => load_project_file(path, config.project.tie_policy)?,
        None => Project::with_tie_policy(project_name(&args), config.project.tie_policy),
    };
    let validator = Validator::from_config(&config)?;

    let mut watcher = SceneWatcher::new(
        ProjectHandle::new(project),
        validator,
        &args.scenes,
        &config,
    );
    if let Some(dir) = &args.report_dir {
        watcher = watcher.with_report_dir(dir);
    }
    if let Some(format) = args.format {
        watcher = watcher.with_format(format);
    }
    if let Some(ms) = args.interval_ms {
        watcher = watcher.with_interval(Duration::from_millis(ms.max(1)));
    }

    if args.once {
        let cycle = watcher.poll_once().await?;
        for (path, reason) in cycle.rejected() {
            eprintln!("skipped {}: {}", path.display(), reason);
        }
        let Some(summary) = cycle.summary() else {
            eprintln!("no scene files applied from {}", args.scenes.display());
            return Ok(ExitCode::SUCCESS);
        };
        if let Some(path) = cycle.report_path() {
            eprintln!(
                "{} error(s), {} warning(s), {} info; report written to {}",
                summary.errors(),
                summary.warnings(),
                summary.infos(),
                path.display()
            );
        }
        return Ok(if *summary.errors() == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    watcher
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Interrupt received");
        })
        .await?;
    Ok(ExitCode::SUCCESS)
}

fn project_name(args: &WatchArgs) -> String {
    args.scenes
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scenes".to_string())
}
