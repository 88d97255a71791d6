//! Project lifecycle and concurrency error types.

/// Specific error conditions for project-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProjectErrorKind {
    /// Another writer (or a reader) currently holds the project; retry later
    #[display("Project '{}' is locked by another operation", _0)]
    ProjectLocked(String),
    /// No open project with this id
    #[display("Project '{}' is not open", _0)]
    UnknownProject(String),
    /// A project with this id is already open
    #[display("Project '{}' is already open", _0)]
    DuplicateProject(String),
    /// The project document could not be read at all
    #[display("Invalid project document: {}", _0)]
    InvalidDocument(String),
}

/// Error type for project-level operations.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{ProjectError, ProjectErrorKind};
///
/// let err = ProjectError::new(ProjectErrorKind::ProjectLocked("pilot".to_string()));
/// assert!(err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Project Error: {} at line {} in {}", kind, line, file)]
pub struct ProjectError {
    /// The specific error condition
    pub kind: ProjectErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ProjectError {
    /// Create a new ProjectError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProjectErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ProjectErrorKind {
        &self.kind
    }

    /// Whether the caller may retry the same operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ProjectErrorKind::ProjectLocked(_))
    }
}
