//! Built-in checks, one function per rule predicate.

mod continuity;
mod ordering;
mod structural;

pub(crate) use continuity::{continuous_attribute, use_before_introduction};
pub(crate) use ordering::{shared_sequence_index, timestamp_order};
pub(crate) use structural::{
    attribute_schema, duplicate_scene_ids, malformed_entries, required_metadata, unknown_entities,
};

use crate::Rule;
use scenecheck_core::Finding;
use scenecheck_project::ProjectSnapshot;

/// What a check can see: the rule being evaluated and the project snapshot.
pub(crate) struct CheckContext<'a> {
    pub rule: &'a Rule,
    pub snapshot: &'a ProjectSnapshot,
}

impl CheckContext<'_> {
    /// A finding attributed to the current rule at its configured severity.
    pub fn finding(&self, message: impl Into<String>) -> Finding {
        Finding::new(
            self.rule.id().clone(),
            *self.rule.definition().severity(),
            message,
        )
    }
}
