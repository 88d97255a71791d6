//! Declarative rule definitions.
//!
//! Rules are data: a mapping of rule id to category, severity, scope and a
//! tagged predicate with its parameters. The rule engine interprets them.

use crate::AttributeType;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How serious a finding is. Ordered most severe first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    /// Must be fixed
    Error,
    /// Probably a mistake, possibly intentional
    Warning,
    /// Worth knowing
    Info,
}

/// Rule family. Ordered by evaluation cost, cheapest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleCategory {
    /// Per-scene shape and vocabulary checks
    Structural,
    /// Checks over neighbouring scene pairs
    Ordering,
    /// Checks over an entity's attribute timeline
    Continuity,
}

/// Data slice a rule looks at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleScope {
    /// One scene at a time
    SingleScene,
    /// Adjacent scenes on the timeline
    ScenePair,
    /// One entity across the whole timeline
    EntityTimeline,
}

fn default_marker() -> String {
    "continuity_break".to_string()
}

/// The check a rule performs, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RulePredicate {
    /// Scene entries in the input that could not be parsed
    MalformedScene,
    /// Scene ids that appear more than once in the input
    DuplicateSceneId,
    /// Metadata fields every scene must carry
    RequiredMetadata {
        /// Field names that must be present and non-empty
        #[serde(default)]
        fields: Vec<String>,
        /// Optional expected types for metadata fields
        #[serde(default)]
        types: BTreeMap<String, AttributeType>,
    },
    /// References to entities missing from the active vocabulary
    UnknownEntity,
    /// Snapshot values that do not match the entity's attribute schema
    #[serde(rename = "attribute_schema")]
    SchemaConformance,
    /// Story timestamps that go backwards along the timeline
    TimestampOrder,
    /// Scenes that share a sequence index
    SharedSequenceIndex,
    /// Changes to continuous attributes without a narrative marker
    ContinuousAttribute {
        /// Scene flag that explains a change
        #[serde(default = "default_marker")]
        marker: String,
    },
    /// Entities referenced before their declared introduction scene
    UseBeforeIntroduction,
}

impl RulePredicate {
    /// Category implied by the check.
    pub fn category(&self) -> RuleCategory {
        match self {
            RulePredicate::MalformedScene
            | RulePredicate::DuplicateSceneId
            | RulePredicate::RequiredMetadata { .. }
            | RulePredicate::UnknownEntity
            | RulePredicate::SchemaConformance => RuleCategory::Structural,
            RulePredicate::TimestampOrder | RulePredicate::SharedSequenceIndex => {
                RuleCategory::Ordering
            }
            RulePredicate::ContinuousAttribute { .. } | RulePredicate::UseBeforeIntroduction => {
                RuleCategory::Continuity
            }
        }
    }

    /// Scope implied by the check.
    pub fn scope(&self) -> RuleScope {
        match self.category() {
            RuleCategory::Structural => RuleScope::SingleScene,
            RuleCategory::Ordering => RuleScope::ScenePair,
            RuleCategory::Continuity => RuleScope::EntityTimeline,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

/// One entry of a rule configuration (the value side of `rule id -> definition`).
///
/// ```
/// use scenecheck_core::{RuleCategory, RuleDefinition, RulePredicate, Severity};
///
/// let def: RuleDefinition = serde_json::from_str(
///     r#"{"category": "continuity", "severity": "error", "scope": "entity_timeline",
///         "check": "continuous_attribute"}"#,
/// )
/// .unwrap();
/// assert_eq!(*def.category(), RuleCategory::Continuity);
/// assert!(*def.enabled());
/// assert!(matches!(def.predicate(), RulePredicate::ContinuousAttribute { marker } if marker == "continuity_break"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RuleDefinition {
    category: RuleCategory,
    severity: Severity,
    scope: RuleScope,
    #[serde(default = "default_enabled")]
    enabled: bool,
    /// Lower runs earlier within a category.
    #[serde(default = "default_priority")]
    priority: u32,
    #[serde(flatten)]
    predicate: RulePredicate,
}

impl RuleDefinition {
    /// Definition whose category and scope follow from the predicate.
    pub fn new(predicate: RulePredicate, severity: Severity) -> Self {
        Self {
            category: predicate.category(),
            severity,
            scope: predicate.scope(),
            enabled: true,
            priority: default_priority(),
            predicate,
        }
    }

    /// Enable or disable the rule.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Override the priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}
