//! Entity registry error types.

/// Specific error conditions for entity registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RegistryErrorKind {
    /// An active entity with this id is already registered
    #[display("Entity '{}' is already registered", _0)]
    DuplicateEntity(String),
    /// No entity with this id exists
    #[display("Entity '{}' not found", _0)]
    NotFound(String),
}

/// Error type for entity registry operations.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{RegistryError, RegistryErrorKind};
///
/// let err = RegistryError::new(RegistryErrorKind::DuplicateEntity("rex".to_string()));
/// assert!(format!("{}", err).contains("already registered"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Registry Error: {} at line {} in {}", kind, line, file)]
pub struct RegistryError {
    /// The specific error condition
    pub kind: RegistryErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RegistryError {
    /// Create a new RegistryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RegistryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RegistryErrorKind {
        &self.kind
    }
}
