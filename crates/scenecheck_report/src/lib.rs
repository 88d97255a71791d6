//! Report assembly and rendering for SceneCheck.
//!
//! [`ReportBuilder`] merges rule engine findings with semantic analyzer
//! findings into a deduplicated, severity-ranked [`Report`](scenecheck_core::Report).
//! [`ReportRenderer`] turns a report into JSON, HTML or Markdown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod renderer;

pub use builder::ReportBuilder;
pub use renderer::{ReportFormat, ReportRenderer};
