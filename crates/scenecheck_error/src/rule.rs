//! Rule definition error types.

/// Specific error conditions for rule set construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RuleErrorKind {
    /// A rule definition is unusable as written
    #[display("Invalid rule '{}': {}", rule, reason)]
    InvalidDefinition {
        /// Rule id
        rule: String,
        /// What is wrong with it
        reason: String,
    },
    /// Declared category or scope does not match the rule's check
    #[display("Rule '{}' declares {} but its check is {}", rule, declared, expected)]
    CategoryMismatch {
        /// Rule id
        rule: String,
        /// Declared category/scope
        declared: String,
        /// Category/scope implied by the check
        expected: String,
    },
}

/// Error type for rule set construction.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rule Error: {} at line {} in {}", kind, line, file)]
pub struct RuleError {
    /// The specific error condition
    pub kind: RuleErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RuleError {
    /// Create a new RuleError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RuleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RuleErrorKind {
        &self.kind
    }
}
