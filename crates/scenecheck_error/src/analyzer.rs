//! Semantic analyzer error types and retry classification.

/// Semantic analyzer failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AnalyzerErrorKind {
    /// The call did not finish within the per-call timeout
    #[display("Semantic analysis timed out after {} ms", _0)]
    Timeout(u64),
    /// The caller's deadline passed before the call could start or finish
    #[display("Validation deadline exceeded before semantic analysis completed")]
    DeadlineExceeded,
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Request could not be sent
    #[display("Analyzer request failed: {}", _0)]
    Request(String),
    /// Reply did not contain a usable analysis
    #[display("Could not parse analyzer response: {}", _0)]
    ResponseParse(String),
    /// Analyzer refused or is otherwise unreachable
    #[display("Analyzer unavailable: {}", _0)]
    Unavailable(String),
}

impl AnalyzerErrorKind {
    /// Check if this error type is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalyzerErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            AnalyzerErrorKind::Timeout(_) => true,
            AnalyzerErrorKind::Request(_) => true,
            AnalyzerErrorKind::Unavailable(_) => true,
            _ => false,
        }
    }
}

/// Analyzer error with source location tracking.
///
/// # Examples
///
/// ```
/// use scenecheck_error::{AnalyzerError, AnalyzerErrorKind};
///
/// let err = AnalyzerError::new(AnalyzerErrorKind::Http {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
/// assert!(!AnalyzerError::new(AnalyzerErrorKind::MissingApiKey).is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Analyzer Error: {} at line {} in {}", kind, line, file)]
pub struct AnalyzerError {
    /// The kind of error that occurred
    pub kind: AnalyzerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AnalyzerError {
    /// Create a new AnalyzerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AnalyzerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AnalyzerErrorKind {
        &self.kind
    }

    /// Returns true if a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for analyzer calls.
pub type AnalyzerResult<T> = std::result::Result<T, AnalyzerError>;
