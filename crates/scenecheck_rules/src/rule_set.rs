//! Rule sets built from declarative definitions.

use derive_getters::Getters;
use scenecheck_core::{RuleDefinition, RuleId, RulePredicate, Severity};
use scenecheck_error::{RuleError, RuleErrorKind};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A rule definition bound to its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct Rule {
    id: RuleId,
    #[serde(flatten)]
    definition: RuleDefinition,
}

impl Rule {
    /// Bind a definition to an id.
    pub fn new(id: impl Into<RuleId>, definition: RuleDefinition) -> Self {
        Self {
            id: id.into(),
            definition,
        }
    }
}

/// An ordered set of rules.
///
/// Rules are kept in evaluation order: structural, then ordering, then
/// continuity; within a category by priority, then by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Built-in rules with their default severities.
    pub fn defaults() -> Self {
        let mut rules = vec![
            Rule::new(
                "malformed-scene",
                RuleDefinition::new(RulePredicate::MalformedScene, Severity::Error).with_priority(10),
            ),
            Rule::new(
                "duplicate-scene-id",
                RuleDefinition::new(RulePredicate::DuplicateSceneId, Severity::Error)
                    .with_priority(20),
            ),
            Rule::new(
                "required-metadata",
                RuleDefinition::new(
                    RulePredicate::RequiredMetadata {
                        fields: vec!["location".to_string()],
                        types: BTreeMap::new(),
                    },
                    Severity::Error,
                )
                .with_priority(30),
            ),
            Rule::new(
                "unknown-entity",
                RuleDefinition::new(RulePredicate::UnknownEntity, Severity::Error).with_priority(40),
            ),
            Rule::new(
                "attribute-schema",
                RuleDefinition::new(RulePredicate::SchemaConformance, Severity::Warning)
                    .with_priority(50),
            ),
            Rule::new(
                "timestamp-order",
                RuleDefinition::new(RulePredicate::TimestampOrder, Severity::Warning),
            ),
            Rule::new(
                "shared-sequence-index",
                RuleDefinition::new(RulePredicate::SharedSequenceIndex, Severity::Info),
            ),
            Rule::new(
                "continuous-attribute",
                RuleDefinition::new(
                    RulePredicate::ContinuousAttribute {
                        marker: "continuity_break".to_string(),
                    },
                    Severity::Error,
                ),
            ),
            Rule::new(
                "use-before-introduction",
                RuleDefinition::new(RulePredicate::UseBeforeIntroduction, Severity::Error),
            ),
        ];
        sort_rules(&mut rules);
        Self { rules }
    }

    /// Build a rule set from a mapping of rule id to definition.
    ///
    /// # Errors
    ///
    /// - `CategoryMismatch` if a declared category or scope disagrees with the check
    /// - `InvalidDefinition` if a check's parameters are unusable
    #[instrument(skip(definitions), fields(count = definitions.len()))]
    pub fn from_definitions(
        definitions: BTreeMap<String, RuleDefinition>,
    ) -> Result<Self, RuleError> {
        let mut rules = definitions
            .into_iter()
            .map(|(id, definition)| {
                validate(&id, &definition)?;
                Ok(Rule::new(id, definition))
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        sort_rules(&mut rules);
        debug!(rules = rules.len(), "Built rule set");
        Ok(Self { rules })
    }

    /// Replace or add rules by id, keeping the rest.
    pub fn with_overrides(
        self,
        definitions: BTreeMap<String, RuleDefinition>,
    ) -> Result<Self, RuleError> {
        let mut merged: BTreeMap<String, RuleDefinition> = self
            .rules
            .into_iter()
            .map(|rule| (rule.id.to_string(), rule.definition))
            .collect();
        merged.extend(definitions);
        Self::from_definitions(merged)
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Enabled rules in evaluation order.
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| *rule.definition.enabled())
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id.as_str() == id)
    }

    /// Number of rules, enabled or not.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn sort_rules(rules: &mut [Rule]) {
    rules.sort_by(|a, b| {
        let key = |rule: &Rule| {
            (
                *rule.definition.category(),
                *rule.definition.priority(),
                rule.id.clone(),
            )
        };
        key(a).cmp(&key(b))
    });
}

fn validate(id: &str, definition: &RuleDefinition) -> Result<(), RuleError> {
    let predicate = definition.predicate();
    if *definition.category() != predicate.category() {
        return Err(RuleError::new(RuleErrorKind::CategoryMismatch {
            rule: id.to_string(),
            declared: definition.category().to_string(),
            expected: predicate.category().to_string(),
        }));
    }
    if *definition.scope() != predicate.scope() {
        return Err(RuleError::new(RuleErrorKind::CategoryMismatch {
            rule: id.to_string(),
            declared: definition.scope().to_string(),
            expected: predicate.scope().to_string(),
        }));
    }
    match predicate {
        RulePredicate::RequiredMetadata { fields, types } if fields.is_empty() && types.is_empty() => {
            Err(invalid(id, "required_metadata needs at least one field"))
        }
        RulePredicate::ContinuousAttribute { marker } if marker.trim().is_empty() => {
            Err(invalid(id, "continuous_attribute marker must not be empty"))
        }
        _ => Ok(()),
    }
}

fn invalid(id: &str, reason: &str) -> RuleError {
    RuleError::new(RuleErrorKind::InvalidDefinition {
        rule: id.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_declared_order() {
        let ids: Vec<_> = RuleSet::defaults()
            .rules()
            .iter()
            .map(|rule| rule.id().to_string())
            .collect();
        assert_eq!(
            ids,
            [
                "malformed-scene",
                "duplicate-scene-id",
                "required-metadata",
                "unknown-entity",
                "attribute-schema",
                "shared-sequence-index",
                "timestamp-order",
                "continuous-attribute",
                "use-before-introduction",
            ]
        );
    }

    #[test]
    fn test_overrides_replace_by_id() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "timestamp-order".to_string(),
            RuleDefinition::new(RulePredicate::TimestampOrder, Severity::Error).with_enabled(false),
        );
        let rules = RuleSet::defaults().with_overrides(overrides).unwrap();

        let rule = rules.get("timestamp-order").unwrap();
        assert_eq!(*rule.definition().severity(), Severity::Error);
        assert!(!*rule.definition().enabled());
        assert_eq!(rules.len(), RuleSet::defaults().len());
        assert_eq!(rules.enabled().count(), rules.len() - 1);
    }
}
