//! Configuration error types.

/// Ways loading configuration can fail.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ConfigErrorKind {
    /// An explicitly requested file is absent
    #[display("Configuration file '{}' does not exist", _0)]
    MissingFile(String),
    /// A source could not be read or is not valid TOML
    #[display("Could not read configuration sources: {}", _0)]
    Sources(String),
    /// The merged sources do not fit the expected sections and fields
    #[display("Configuration does not match the expected layout: {}", _0)]
    Schema(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Schema("unknown check `good_vibes`".into()));
/// assert!(err.to_string().contains("good_vibes"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The specific error condition
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
