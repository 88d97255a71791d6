//! Rule evaluation.

use crate::RuleSet;
use crate::checks::{self, CheckContext};
use scenecheck_core::{Finding, RulePredicate, ValidationOptions};
use scenecheck_project::ProjectSnapshot;
use tracing::{debug, instrument};

/// Evaluates a [`RuleSet`] against project snapshots.
///
/// Evaluation only reads the snapshot, so one engine can serve any number of
/// concurrent validations. Findings come out grouped by rule, in rule order.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: RuleSet,
}

impl RuleEngine {
    /// Create an engine for a rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Rules this engine evaluates.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Run every enabled rule.
    ///
    /// `timestamp_order` checks run only when `strict_ordering` is set.
    #[instrument(skip_all, fields(project = %snapshot.project_id(), version = %snapshot.version()))]
    pub fn evaluate(&self, snapshot: &ProjectSnapshot, options: &ValidationOptions) -> Vec<Finding> {
        let mut findings = Vec::new();

        for rule in self.rules.enabled() {
            let ctx = CheckContext { rule, snapshot };
            let produced = match rule.definition().predicate() {
                RulePredicate::MalformedScene => checks::malformed_entries(&ctx),
                RulePredicate::DuplicateSceneId => checks::duplicate_scene_ids(&ctx),
                RulePredicate::RequiredMetadata { fields, types } => {
                    checks::required_metadata(&ctx, fields, types)
                }
                RulePredicate::UnknownEntity => checks::unknown_entities(&ctx),
                RulePredicate::SchemaConformance => checks::attribute_schema(&ctx),
                RulePredicate::TimestampOrder if !options.strict_ordering() => {
                    debug!(rule = %rule.id(), "Skipping timestamp order check");
                    continue;
                }
                RulePredicate::TimestampOrder => checks::timestamp_order(&ctx),
                RulePredicate::SharedSequenceIndex => checks::shared_sequence_index(&ctx),
                RulePredicate::ContinuousAttribute { marker } => {
                    checks::continuous_attribute(&ctx, marker)
                }
                RulePredicate::UseBeforeIntroduction => checks::use_before_introduction(&ctx),
            };
            debug!(rule = %rule.id(), findings = produced.len(), "Evaluated rule");
            findings.extend(produced);
        }

        debug!(findings = findings.len(), "Rule evaluation complete");
        findings
    }
}
