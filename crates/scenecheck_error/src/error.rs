//! Top-level error wrapper types.

use crate::{
    AnalyzerError, ConfigError, JsonError, ProjectError, RegistryError, RuleError, StoreError,
    TrackerError, WatchError,
};

/// Every error condition a SceneCheck crate can raise.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{ConfigError, ConfigErrorKind, SceneCheckError};
///
/// let err: SceneCheckError = ConfigError::new(ConfigErrorKind::Schema("bad severity".into())).into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SceneCheckErrorKind {
    /// Entity registry error
    #[from(RegistryError)]
    Registry(RegistryError),
    /// Scene store error
    #[from(StoreError)]
    Store(StoreError),
    /// Continuity tracker contract violation
    #[from(TrackerError)]
    Tracker(TrackerError),
    /// Project lifecycle or locking error
    #[from(ProjectError)]
    Project(ProjectError),
    /// Rule definition error
    #[from(RuleError)]
    Rule(RuleError),
    /// Semantic analyzer error
    #[from(AnalyzerError)]
    Analyzer(AnalyzerError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Scene directory watch error
    #[from(WatchError)]
    Watch(WatchError),
}

/// SceneCheck error with kind discrimination.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{SceneCheckErrorKind, SceneCheckResult, StoreError, StoreErrorKind};
///
/// fn insert() -> SceneCheckResult<()> {
///     Err(StoreError::new(StoreErrorKind::DuplicateSceneId("s1".to_string())))?
/// }
///
/// let err = insert().unwrap_err();
/// assert!(matches!(err.kind(), SceneCheckErrorKind::Store(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("SceneCheck Error: {}", _0)]
pub struct SceneCheckError(Box<SceneCheckErrorKind>);

impl SceneCheckError {
    /// Create a new error from a kind.
    pub fn new(kind: SceneCheckErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SceneCheckErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to SceneCheckErrorKind
impl<T> From<T> for SceneCheckError
where
    T: Into<SceneCheckErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for SceneCheck operations.
pub type SceneCheckResult<T> = std::result::Result<T, SceneCheckError>;
