//! Per-run validation options.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for one validation run.
///
/// # Example
///
/// ```
/// use scenecheck_core::ValidationOptions;
///
/// let options = ValidationOptions::default().with_strict_ordering(false);
/// assert!(!options.strict_ordering());
/// assert_eq!(*options.max_concurrent_semantic_calls(), 4);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct ValidationOptions {
    /// Report timestamps that go backwards along the timeline
    #[serde(default = "default_strict_ordering")]
    #[getter(skip)]
    strict_ordering: bool,

    /// Upper bound on in-flight semantic analyzer calls
    #[serde(default = "default_max_concurrent")]
    max_concurrent_semantic_calls: usize,

    /// Whether to call the semantic analyzer at all
    #[serde(default)]
    #[getter(skip)]
    semantic_analysis_enabled: bool,

    /// Timeout for a single analyzer call (milliseconds)
    #[serde(default = "default_semantic_timeout_ms")]
    semantic_timeout_ms: u64,

    /// Deadline for the whole run's external calls (milliseconds, none if absent)
    #[serde(default)]
    deadline_ms: Option<u64>,
}

fn default_strict_ordering() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    4
}

fn default_semantic_timeout_ms() -> u64 {
    30_000
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict_ordering: default_strict_ordering(),
            max_concurrent_semantic_calls: default_max_concurrent(),
            semantic_analysis_enabled: false,
            semantic_timeout_ms: default_semantic_timeout_ms(),
            deadline_ms: None,
        }
    }
}

impl ValidationOptions {
    /// Creates a new options builder.
    pub fn builder() -> ValidationOptionsBuilder {
        ValidationOptionsBuilder::default()
    }

    /// Whether backwards timestamps are reported.
    pub fn strict_ordering(&self) -> bool {
        self.strict_ordering
    }

    /// Whether the semantic analyzer runs.
    pub fn semantic_analysis_enabled(&self) -> bool {
        self.semantic_analysis_enabled
    }

    /// Per-call analyzer timeout.
    pub fn semantic_timeout(&self) -> Duration {
        Duration::from_millis(self.semantic_timeout_ms)
    }

    /// Deadline for external calls, relative to the start of the run.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}
