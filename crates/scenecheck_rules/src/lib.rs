//! Declarative rules and the rule engine for SceneCheck.
//!
//! Rules are data. A [`RuleSet`] is built from a mapping of rule id to
//! [`RuleDefinition`](scenecheck_core::RuleDefinition) (usually loaded from
//! configuration) and the [`RuleEngine`] interprets each definition's
//! predicate against a [`ProjectSnapshot`](scenecheck_project::ProjectSnapshot).
//!
//! Evaluation order is fixed: structural checks, then ordering checks, then
//! continuity checks; within a category by priority, then rule id.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod checks;
mod engine;
mod rule_set;

pub use engine::RuleEngine;
pub use rule_set::{Rule, RuleSet};
