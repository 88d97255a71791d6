//! JSON error types.

/// Which JSON boundary failed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum JsonErrorKind {
    /// A project document could not be parsed
    #[display("Project document is not valid JSON: {}", _0)]
    ProjectDocument(String),
    /// A watched scene file does not hold a scene
    #[display("Scene file '{}' is not a valid scene: {}", path, reason)]
    SceneFile {
        /// File that failed to parse
        path: String,
        /// Parser message
        reason: String,
    },
    /// Project content could not be encoded for the snapshot version hash
    #[display("Could not encode project content for hashing: {}", _0)]
    SnapshotContent(String),
    /// A report could not be serialized
    #[display("Could not serialize report: {}", _0)]
    Report(String),
}

/// JSON error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", kind, line, file)]
pub struct JsonError {
    /// The specific error condition
    pub kind: JsonErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError at the current location.
    #[track_caller]
    pub fn new(kind: JsonErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &JsonErrorKind {
        &self.kind
    }
}
