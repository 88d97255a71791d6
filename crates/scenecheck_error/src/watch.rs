//! Scene directory watch error types.

/// Kinds of watch errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum WatchErrorKind {
    /// The scene directory exists but cannot be listed
    #[display("Failed to list scene directory: {}", _0)]
    DirectoryRead(String),
    /// The report directory cannot be created
    #[display("Failed to create report directory: {}", _0)]
    DirectoryCreation(String),
    /// A report cannot be written
    #[display("Failed to write report: {}", _0)]
    ReportWrite(String),
}

/// Watch error with location tracking.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{WatchError, WatchErrorKind};
///
/// let err = WatchError::new(WatchErrorKind::ReportWrite("reports/a.html".to_string()));
/// assert!(format!("{}", err).contains("Failed to write report"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Watch Error: {} at line {} in {}", kind, line, file)]
pub struct WatchError {
    /// The kind of error that occurred
    pub kind: WatchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl WatchError {
    /// Create a new WatchError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WatchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WatchErrorKind {
        &self.kind
    }
}
