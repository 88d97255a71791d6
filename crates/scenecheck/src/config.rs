//! Layered configuration.
//!
//! Sources in order of precedence (later sources override earlier):
//! 1. Bundled defaults (`scenecheck.toml` shipped with the crate)
//! 2. User config in home directory (`~/.config/scenecheck/scenecheck.toml`)
//! 3. User config in current directory (`./scenecheck.toml`)
//! 4. An explicit file passed to [`SceneCheckConfig::load_with`]

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat};
use scenecheck_analyzer::{AnalysisKind, DEFAULT_MODEL};
use scenecheck_core::{RuleDefinition, ValidationOptions};
use scenecheck_error::{ConfigError, ConfigErrorKind, SceneCheckResult};
use scenecheck_project::TiePolicy;
use scenecheck_report::ReportFormat;
use scenecheck_rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../scenecheck.toml");

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn all_analyses() -> Vec<AnalysisKind> {
    AnalysisKind::iter().collect()
}

/// `[project]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProjectSettings {
    /// How scenes sharing a sequence index are handled
    #[serde(default)]
    pub tie_policy: TiePolicy,
}

/// `[analyzer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalyzerSettings {
    /// Gemini model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Request quota; zero disables the limit
    #[serde(default)]
    pub requests_per_minute: u32,

    /// Kinds of analysis to request
    #[serde(default = "all_analyses")]
    pub analyses: Vec<AnalysisKind>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            requests_per_minute: 0,
            analyses: all_analyses(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportSettings {
    /// Output format
    #[serde(default)]
    pub format: ReportFormat,
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_ignore_suffixes() -> Vec<String> {
    vec!["_temp.json".to_string(), ".bak".to_string()]
}

/// `[watch]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WatchSettings {
    /// Rescan period of the scene directory
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Directory reports are written to
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Scene files ending in one of these are skipped
    #[serde(default = "default_ignore_suffixes")]
    pub ignore_suffixes: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            report_dir: default_report_dir(),
            ignore_suffixes: default_ignore_suffixes(),
        }
    }
}

/// Top-level SceneCheck configuration.
///
/// # Example
///
/// ```no_run
/// use scenecheck::SceneCheckConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SceneCheckConfig::load()?;
/// let rules = config.rule_set()?;
/// println!("{} rules, strict ordering: {}", rules.len(), config.validation.strict_ordering());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SceneCheckConfig {
    /// Per-run validation options
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Project loading settings
    #[serde(default)]
    pub project: ProjectSettings,

    /// Semantic analyzer settings
    #[serde(default)]
    pub analyzer: AnalyzerSettings,

    /// Report output settings
    #[serde(default)]
    pub report: ReportSettings,

    /// Scene directory watch settings
    #[serde(default)]
    pub watch: WatchSettings,

    /// Rule definitions keyed by rule id, merged over the built-in rules
    #[serde(default)]
    pub rules: BTreeMap<String, RuleDefinition>,
}

impl SceneCheckConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> SceneCheckResult<Self> {
        debug!("Loading configuration from file");

        resolve(Config::builder().add_source(File::from(existing(path.as_ref())?)))
    }

    /// Load configuration with precedence: current dir > home dir > bundled default.
    #[instrument]
    pub fn load() -> SceneCheckResult<Self> {
        Self::load_with(None::<&Path>)
    }

    /// Like [`load`](Self::load), with an explicit file layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any source fails to parse.
    #[instrument(skip(extra))]
    pub fn load_with(extra: Option<impl AsRef<Path>>) -> SceneCheckResult<Self> {
        debug!("Loading configuration with precedence: explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/scenecheck/scenecheck.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("scenecheck").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(existing(path.as_ref())?));
        }

        resolve(builder)
    }

    /// Built-in rules with the configured definitions merged over them.
    ///
    /// # Errors
    ///
    /// Returns the rule error of the first invalid definition.
    pub fn rule_set(&self) -> SceneCheckResult<RuleSet> {
        Ok(RuleSet::defaults().with_overrides(self.rules.clone())?)
    }
}

fn existing(path: &Path) -> Result<&Path, ConfigError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::new(ConfigErrorKind::MissingFile(
            path.display().to_string(),
        )))
    }
}

fn resolve(builder: ConfigBuilder<DefaultState>) -> SceneCheckResult<SceneCheckConfig> {
    builder
        .build()
        .map_err(|e| ConfigError::new(ConfigErrorKind::Sources(e.to_string())))?
        .try_deserialize()
        .map_err(|e| ConfigError::new(ConfigErrorKind::Schema(e.to_string())).into())
}
