//! Error types for the SceneCheck library.
//!
//! This crate provides the foundation error types used throughout the SceneCheck workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Conditions that a validation run can recover from (malformed scenes, unknown
//! entities, analyzer outages) are reported as findings, not as these errors.
//!
//! # Examples
//!
//! ```
//! use scenecheck_error::{RegistryError, RegistryErrorKind, SceneCheckResult};
//!
//! fn lookup() -> SceneCheckResult<()> {
//!     Err(RegistryError::new(RegistryErrorKind::NotFound("rex".to_string())))?
//! }
//!
//! assert!(lookup().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod json;
mod project;
mod registry;
mod rule;
mod store;
mod tracker;
mod watch;

pub use analyzer::{AnalyzerError, AnalyzerErrorKind, AnalyzerResult};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{SceneCheckError, SceneCheckErrorKind, SceneCheckResult};
pub use json::{JsonError, JsonErrorKind};
pub use project::{ProjectError, ProjectErrorKind};
pub use registry::{RegistryError, RegistryErrorKind};
pub use rule::{RuleError, RuleErrorKind};
pub use store::{StoreError, StoreErrorKind};
pub use tracker::{TrackerError, TrackerErrorKind};
pub use watch::{WatchError, WatchErrorKind};
