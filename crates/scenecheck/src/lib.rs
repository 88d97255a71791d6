//! SceneCheck - continuity validation for ordered scene collections.
//!
//! A project is a vocabulary of entities (characters, props, locations) and a
//! timeline of scenes that reference them with attribute snapshots. SceneCheck
//! checks the timeline against a declarative rule set, optionally asks a
//! semantic analyzer whether each scene still makes narrative sense, and
//! produces a severity-ranked report.
//!
//! # Architecture
//!
//! SceneCheck is organized as a workspace with focused crates:
//!
//! - `scenecheck_error` - Error types
//! - `scenecheck_core` - Data model (entities, scenes, rules, findings, reports)
//! - `scenecheck_project` - Registry, scene store, continuity tracker, snapshots
//! - `scenecheck_rules` - Rule set and rule engine
//! - `scenecheck_analyzer` - Semantic analyzer trait, Gemini client, dispatcher
//! - `scenecheck_report` - Report builder and renderers
//!
//! This crate re-exports the public surface and adds [`Validator`],
//! [`SceneCheckConfig`] and [`SceneWatcher`], which re-validates a project as
//! scene files change on disk.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use scenecheck::{ReportFormat, ReportRenderer, SceneCheckConfig, Validator, load_project_file};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SceneCheckConfig::load()?;
//!     let project = load_project_file("pilot.json", config.project.tie_policy)?;
//!
//!     let validator = Validator::from_config(&config)?;
//!     let report = validator.validate(&project.snapshot()?, &config.validation).await;
//!     println!("{}", ReportRenderer::render(&report, ReportFormat::Markdown)?);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod validator;
mod watch;

pub use config::{
    AnalyzerSettings, ProjectSettings, ReportSettings, SceneCheckConfig, WatchSettings,
};
pub use validator::{Validator, is_retryable, validate};
pub use watch::{SceneWatcher, WatchCycle};

// Re-export workspace crates
pub use scenecheck_analyzer::{
    AnalysisKind, AnalysisRequest, GeminiAnalyzer, PrecedingScene, SEMANTIC_COHERENCE_RULE,
    SEMANTIC_DIALOGUE_RULE, SEMANTIC_EMOTION_RULE, SEMANTIC_UNAVAILABLE_RULE, SemanticAnalyzer,
    SemanticDispatcher,
};
pub use scenecheck_core::{
    AttributeSchema, AttributeSnapshot, AttributeSpec, AttributeState, AttributeType, Entity,
    EntityId, EntityKind, Finding, OrderKey, Report, ReportSummary, RuleCategory, RuleDefinition,
    RuleId, RulePredicate, RuleScope, Scene, SceneId, ScenePatch, Severity, ValidationOptions,
    ValidationOptionsBuilder, init_tracing, init_tracing_with_default,
};
pub use scenecheck_error::{
    AnalyzerError, AnalyzerErrorKind, AnalyzerResult, ConfigError, ConfigErrorKind, JsonError,
    JsonErrorKind, ProjectError, ProjectErrorKind, RegistryError, RegistryErrorKind, RuleError,
    RuleErrorKind, SceneCheckError, SceneCheckErrorKind, SceneCheckResult, StoreError,
    StoreErrorKind, TrackerError, TrackerErrorKind, WatchError, WatchErrorKind,
};
pub use scenecheck_project::{
    ContinuityTracker, EntityRegistry, LoadIssue, Project, ProjectHandle, ProjectSnapshot,
    SceneStore, TiePolicy, Transition, Workspace, load_project, load_project_file,
};
pub use scenecheck_report::{ReportBuilder, ReportFormat, ReportRenderer};
pub use scenecheck_rules::{Rule, RuleEngine, RuleSet};
