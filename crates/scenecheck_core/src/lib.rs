//! Core data types for the SceneCheck continuity validator.
//!
//! This crate provides the vocabulary shared by every other SceneCheck crate:
//! entities and their attribute schemas, scenes and their ordering keys, rule
//! definitions, findings, reports and validation options.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod finding;
mod ids;
mod options;
mod report;
mod rule;
mod scene;
mod telemetry;

pub use entity::{AttributeSchema, AttributeSpec, AttributeType, Entity, EntityKind};
pub use finding::Finding;
pub use ids::{EntityId, RuleId, SceneId};
pub use options::{ValidationOptions, ValidationOptionsBuilder};
pub use report::{Report, ReportSummary};
pub use rule::{RuleCategory, RuleDefinition, RulePredicate, RuleScope, Severity};
pub use scene::{AttributeSnapshot, AttributeState, OrderKey, Scene, ScenePatch};
pub use telemetry::{init_tracing, init_tracing_with_default};
