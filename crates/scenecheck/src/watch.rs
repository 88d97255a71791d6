//! Re-validation of a project as scene files change on disk.
//!
//! A [`SceneWatcher`] owns a scene directory holding one scene per `*.json`
//! file. Each poll applies new or edited files to the live project through
//! [`ProjectHandle::mutate`]: an unknown scene id is inserted, a known one is
//! moved to its new sequence index if needed and then patched with everything
//! the file states. When anything was applied the project is validated again
//! and the report is written to the report directory.
//!
//! Deleting a scene file leaves the scene in the project.

use crate::{SceneCheckConfig, Validator, is_retryable};
use chrono::Local;
use derive_getters::Getters;
use scenecheck_core::{Report, ReportSummary, Scene, ScenePatch, ValidationOptions};
use scenecheck_error::{JsonError, JsonErrorKind, SceneCheckResult, WatchError, WatchErrorKind};
use scenecheck_project::{Project, ProjectHandle};
use scenecheck_report::{ReportFormat, ReportRenderer};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// What one poll of the scene directory did.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct WatchCycle {
    /// Files applied to the project, in path order
    applied: Vec<PathBuf>,
    /// Files that could not be applied, with the reason
    rejected: Vec<(PathBuf, String)>,
    /// Report written after the changes, if any were applied
    report_path: Option<PathBuf>,
    /// Summary of that report
    summary: Option<ReportSummary>,
}

/// Polls a scene directory and re-validates the project after each change.
#[derive(Debug)]
pub struct SceneWatcher {
    handle: ProjectHandle,
    validator: Validator,
    scene_dir: PathBuf,
    options: ValidationOptions,
    report_dir: PathBuf,
    format: ReportFormat,
    interval: Duration,
    ignore_suffixes: Vec<String>,
    digests: HashMap<PathBuf, String>,
    cycles: u64,
}

impl SceneWatcher {
    /// Watch `scene_dir` for `handle`, using the `[watch]`, `[validation]`
    /// and `[report]` settings of `config`.
    pub fn new(
        handle: ProjectHandle,
        validator: Validator,
        scene_dir: impl Into<PathBuf>,
        config: &SceneCheckConfig,
    ) -> Self {
        Self {
            handle,
            validator,
            scene_dir: scene_dir.into(),
            options: config.validation.clone(),
            report_dir: config.watch.report_dir.clone(),
            format: config.report.format,
            interval: Duration::from_millis(config.watch.interval_ms.max(1)),
            ignore_suffixes: config.watch.ignore_suffixes.clone(),
            digests: HashMap::new(),
            cycles: 0,
        }
    }

    /// Write reports here.
    pub fn with_report_dir(mut self, report_dir: impl Into<PathBuf>) -> Self {
        self.report_dir = report_dir.into();
        self
    }

    /// Render reports in this format.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Rescan period used by [`run`](Self::run).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Project being kept up to date.
    pub fn handle(&self) -> &ProjectHandle {
        &self.handle
    }

    /// Apply every new or edited scene file, then validate and write a report
    /// if anything was applied.
    ///
    /// # Errors
    ///
    /// Fails if the scene directory cannot be listed or the report cannot be
    /// written. Files that do not parse or do not fit the project are listed
    /// as rejected instead.
    #[instrument(skip(self), fields(project = %self.handle.id(), dir = %self.scene_dir.display()))]
    pub async fn poll_once(&mut self) -> SceneCheckResult<WatchCycle> {
        self.cycles += 1;
        let mut cycle = WatchCycle::default();

        for (path, bytes) in self.changed_files().await? {
            match self.apply(&path, &bytes).await {
                Ok(()) => {
                    info!(path = %path.display(), "Applied scene file");
                    cycle.applied.push(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Rejected scene file");
                    cycle.rejected.push((path, e.to_string()));
                }
            }
        }

        if cycle.applied.is_empty() {
            debug!(rejected = cycle.rejected.len(), "No scene changes applied");
            return Ok(cycle);
        }

        let report = self
            .validator
            .validate_handle(&self.handle, &self.options)
            .await?;
        let path = self.write_report(&report).await?;
        info!(
            errors = report.summary().errors(),
            warnings = report.summary().warnings(),
            report = %path.display(),
            "Re-validated after scene changes"
        );
        cycle.summary = Some(*report.summary());
        cycle.report_path = Some(path);
        Ok(cycle)
    }

    /// Poll on every tick until `shutdown` resolves.
    ///
    /// A failed poll that [`is_retryable`] is logged and retried on the next
    /// tick; any other failure stops the watch.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> SceneCheckResult<()> {
        let mut ticker = tokio::time::interval(self.interval);
        tokio::pin!(shutdown);
        info!(
            dir = %self.scene_dir.display(),
            interval_ms = self.interval.as_millis() as u64,
            "Watching scene directory"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(cycles = self.cycles, "Watch stopped");
                    return Ok(());
                }
                _ = ticker.tick() => match self.poll_once().await {
                    Ok(_) => {}
                    Err(e) if is_retryable(e.kind()) => {
                        warn!(error = %e, "Watch cycle failed, retrying on next tick");
                    }
                    Err(e) => {
                        error!(error = %e, "Watch cycle failed");
                        return Err(e);
                    }
                },
            }
        }
    }

    /// Watched files whose content differs from the last poll, in path order.
    async fn changed_files(&mut self) -> SceneCheckResult<Vec<(PathBuf, Vec<u8>)>> {
        let mut entries = match tokio::fs::read_dir(&self.scene_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Scene directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.list_error(e).into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.list_error(e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|kind| kind.is_file())
                .unwrap_or(false);
            let path = entry.path();
            if is_file && self.is_watched(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut changed = Vec::new();
        for path in paths {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not read scene file");
                    continue;
                }
            };
            let digest = format!("{:x}", Sha256::digest(&bytes));
            if self.digests.get(&path) == Some(&digest) {
                continue;
            }
            self.digests.insert(path.clone(), digest);
            changed.push((path, bytes));
        }
        Ok(changed)
    }

    fn is_watched(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        name.ends_with(".json")
            && !self
                .ignore_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()))
    }

    async fn apply(&self, path: &Path, bytes: &[u8]) -> SceneCheckResult<()> {
        let scene: Scene = serde_json::from_slice(bytes).map_err(|e| {
            JsonError::new(JsonErrorKind::SceneFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        self.handle
            .mutate(|project| apply_scene(project, scene))
            .await
    }

    async fn write_report(&self, report: &Report) -> SceneCheckResult<PathBuf> {
        tokio::fs::create_dir_all(&self.report_dir)
            .await
            .map_err(|e| {
                WatchError::new(WatchErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    self.report_dir.display(),
                    e
                )))
            })?;

        let name = format!(
            "validation_{}_{}_{}.{}",
            self.handle.id(),
            Local::now().format("%Y%m%d_%H%M%S"),
            self.cycles,
            self.format.extension()
        );
        let path = self.report_dir.join(name);
        let rendered = ReportRenderer::render(report, self.format)?;
        tokio::fs::write(&path, rendered).await.map_err(|e| {
            WatchError::new(WatchErrorKind::ReportWrite(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(path)
    }

    fn list_error(&self, e: std::io::Error) -> WatchError {
        WatchError::new(WatchErrorKind::DirectoryRead(format!(
            "{}: {}",
            self.scene_dir.display(),
            e
        )))
    }
}

/// Insert a new scene, or move and patch the stored scene with the same id.
fn apply_scene(project: &mut Project, scene: Scene) -> SceneCheckResult<()> {
    let id = scene.id().clone();
    let Some(current_index) = project.store().get(&id).map(|stored| *stored.sequence_index())
    else {
        return project.insert_scene(scene);
    };

    if current_index != *scene.sequence_index() {
        project.reorder_scene(&id, *scene.sequence_index())?;
    }
    project.update_scene(&id, ScenePatch::from(scene))
}
