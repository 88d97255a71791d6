//! Validation entry point.

use crate::SceneCheckConfig;
use scenecheck_analyzer::{GeminiAnalyzer, SEMANTIC_UNAVAILABLE_RULE, SemanticDispatcher};
use scenecheck_core::{Finding, Report, Severity, ValidationOptions};
use scenecheck_error::{AnalyzerErrorKind, SceneCheckErrorKind, SceneCheckResult};
use scenecheck_project::{ProjectHandle, ProjectSnapshot};
use scenecheck_report::ReportBuilder;
use scenecheck_rules::{RuleEngine, RuleSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Runs the rule engine and, when enabled, the semantic analyzer over a
/// project snapshot and assembles the report.
///
/// Validation never fails. Every recoverable problem, including an
/// unreachable analyzer, is reported as a finding.
///
/// # Example
///
/// ```rust
/// use scenecheck::{RuleSet, Validator};
/// use scenecheck_core::{Scene, ValidationOptions};
/// use scenecheck_project::Project;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut project = Project::new("pilot");
/// project.insert_scene(Scene::new("s1", 1).with_metadata("location", "diner".into()))?;
///
/// let validator = Validator::new(RuleSet::defaults());
/// let report = validator.validate(&project.snapshot()?, &ValidationOptions::default()).await;
/// assert!(report.is_clean());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    engine: RuleEngine,
    dispatcher: Option<SemanticDispatcher>,
}

impl Validator {
    /// Validator without a semantic analyzer.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            engine: RuleEngine::new(rules),
            dispatcher: None,
        }
    }

    /// Attach a semantic dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: SemanticDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Build a validator from configuration.
    ///
    /// When semantic analysis is enabled, a Gemini analyzer is attached if
    /// `GEMINI_API_KEY` is set. Without a key the validator runs rules only
    /// and each validation reports the analyzer as unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured rule definition is invalid.
    #[instrument(skip(config))]
    pub fn from_config(config: &SceneCheckConfig) -> SceneCheckResult<Self> {
        let validator = Self::new(config.rule_set()?);
        if !config.validation.semantic_analysis_enabled() {
            return Ok(validator);
        }

        match GeminiAnalyzer::from_env(&config.analyzer.model) {
            Ok(analyzer) => {
                let dispatcher = SemanticDispatcher::new(Arc::new(analyzer))
                    .with_kinds(config.analyzer.analyses.iter().copied())
                    .with_requests_per_minute(config.analyzer.requests_per_minute);
                Ok(validator.with_dispatcher(dispatcher))
            }
            Err(e) if matches!(e.kind(), AnalyzerErrorKind::MissingApiKey) => {
                warn!("GEMINI_API_KEY not set, semantic analysis will be reported unavailable");
                Ok(validator)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rule engine in use.
    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Validate a snapshot.
    #[instrument(skip_all, fields(project = %snapshot.project_id(), version = %snapshot.version()))]
    pub async fn validate(&self, snapshot: &ProjectSnapshot, options: &ValidationOptions) -> Report {
        let findings = self.engine.evaluate(snapshot, options);

        let semantic = match (&self.dispatcher, options.semantic_analysis_enabled()) {
            (_, false) => Vec::new(),
            (Some(dispatcher), true) => dispatcher.run(snapshot, options).await,
            (None, true) => vec![no_analyzer()],
        };

        let report = ReportBuilder::for_snapshot(snapshot)
            .with_findings(findings)
            .with_semantic_findings(semantic)
            .build();
        info!(
            errors = report.summary().errors(),
            warnings = report.summary().warnings(),
            infos = report.summary().infos(),
            "Validation finished"
        );
        report
    }

    /// Snapshot a live project and validate it.
    ///
    /// Writers may continue while validation runs; the report reflects the
    /// content at snapshot time.
    ///
    /// # Errors
    ///
    /// Returns an error only if the snapshot cannot be captured.
    pub async fn validate_handle(
        &self,
        handle: &ProjectHandle,
        options: &ValidationOptions,
    ) -> SceneCheckResult<Report> {
        let snapshot = handle.snapshot().await?;
        Ok(self.validate(&snapshot, options).await)
    }
}

/// Validate `snapshot` against `rules` with no semantic analyzer attached.
///
/// If `options` enables semantic analysis the report carries one
/// `semantic-analysis-unavailable` warning.
pub async fn validate(
    snapshot: &ProjectSnapshot,
    rules: &RuleSet,
    options: &ValidationOptions,
) -> Report {
    Validator::new(rules.clone()).validate(snapshot, options).await
}

fn no_analyzer() -> Finding {
    Finding::new(
        SEMANTIC_UNAVAILABLE_RULE,
        Severity::Warning,
        "Semantic analysis was requested but no analyzer is configured",
    )
    .with_fix("Set GEMINI_API_KEY or disable semantic_analysis_enabled")
}

/// Whether an error is worth retrying unchanged.
///
/// A locked project and transient analyzer failures qualify. The CLI exits
/// with a distinct status for these and the scene watcher retries them on its
/// next tick.
pub fn is_retryable(kind: &SceneCheckErrorKind) -> bool {
    match kind {
        SceneCheckErrorKind::Project(e) => e.is_retryable(),
        SceneCheckErrorKind::Analyzer(e) => e.is_retryable(),
        _ => false,
    }
}
