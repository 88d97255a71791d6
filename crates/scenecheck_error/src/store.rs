//! Scene store error types.

/// Specific error conditions for scene store operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// A scene with this id already exists
    #[display("Scene '{}' already exists", _0)]
    DuplicateSceneId(String),
    /// No scene with this id exists
    #[display("Scene '{}' not found", _0)]
    SceneNotFound(String),
    /// The store rejects shared sequence indices and the target is occupied
    #[display("Sequence index {} for scene '{}' is already taken by '{}'", sequence_index, scene, occupant)]
    SequenceConflict {
        /// Scene being inserted or moved
        scene: String,
        /// Requested sequence index
        sequence_index: i64,
        /// Scene already holding that index
        occupant: String,
    },
}

/// Error type for scene store operations.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::DuplicateSceneId("s1".to_string()));
/// assert!(format!("{}", err).contains("already exists"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The specific error condition
    pub kind: StoreErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl StoreError {
    /// Create a new StoreError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoreErrorKind {
        &self.kind
    }
}
