//! Continuity tracker error types.
//!
//! These are contract violations: the caller asked about an entity or scene the
//! project has never seen.

/// Specific error conditions for continuity tracker queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TrackerErrorKind {
    /// The entity never appeared in any scene
    #[display("Entity '{}' has no timeline", _0)]
    UnknownEntity(String),
    /// The scene is not in the scene store
    #[display("Scene '{}' is not part of the timeline", _0)]
    UnknownScene(String),
}

/// Error type for continuity tracker queries.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Tracker Error: {} at line {} in {}", kind, line, file)]
pub struct TrackerError {
    /// The specific error condition
    pub kind: TrackerErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TrackerError {
    /// Create a new TrackerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TrackerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TrackerErrorKind {
        &self.kind
    }
}
