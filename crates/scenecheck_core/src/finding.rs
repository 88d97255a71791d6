//! A single reported issue.

use crate::{EntityId, RuleId, SceneId, Severity};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One issue produced by one rule against one scene/entity scope.
///
/// ```
/// use scenecheck_core::{Finding, Severity};
///
/// let finding = Finding::new("continuous-attribute", Severity::Error, "jacket changed")
///     .with_scenes(["a", "b"])
///     .with_entity("rex")
///     .with_fix("Add a continuity_break flag to scene b");
/// assert_eq!(finding.scene_ids().len(), 2);
/// assert_eq!(finding.entity_id().as_ref().unwrap().as_str(), "rex");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Finding {
    rule_id: RuleId,
    severity: Severity,
    #[serde(default)]
    scene_ids: Vec<SceneId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entity_id: Option<EntityId>,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggested_fix: Option<String>,
}

impl Finding {
    /// Create a finding with no scene or entity attached yet.
    pub fn new(rule_id: impl Into<RuleId>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            scene_ids: Vec::new(),
            entity_id: None,
            message: message.into(),
            suggested_fix: None,
        }
    }

    /// Attach implicated scenes.
    pub fn with_scenes<I, S>(mut self, scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SceneId>,
    {
        self.scene_ids.extend(scenes.into_iter().map(Into::into));
        self
    }

    /// Attach the implicated entity.
    pub fn with_entity(mut self, entity: impl Into<EntityId>) -> Self {
        self.entity_id = Some(entity.into());
        self
    }

    /// Attach a suggested fix.
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}
