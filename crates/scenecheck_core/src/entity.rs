//! Entities and their declared attribute schemas.

use crate::{EntityId, SceneId};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// What kind of recurring thing an entity is.
///
/// All kinds share the same attribute-schema capability; continuity checks do
/// not specialise on the kind.
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
pub enum EntityKind {
    /// A character or performer
    Character,
    /// A prop or costume piece
    Prop,
    /// A location or set, including its environment and lighting state
    Location,
    /// Anything else tracked across scenes
    Other,
}

/// Expected type (or enum domain) of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeType {
    /// Any JSON string
    String,
    /// Any JSON number
    Number,
    /// A JSON number without a fractional part
    Integer,
    /// A JSON boolean
    Boolean,
    /// A string drawn from a fixed set of values
    Enum {
        /// Allowed values
        values: Vec<String>,
    },
}

impl AttributeType {
    /// Whether `value` conforms to this type.
    pub fn accepts(&self, value: &JsonValue) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Number => value.is_number(),
            AttributeType::Integer => value.is_i64() || value.is_u64(),
            AttributeType::Boolean => value.is_boolean(),
            AttributeType::Enum { values } => value
                .as_str()
                .is_some_and(|s| values.iter().any(|allowed| allowed == s)),
        }
    }

    /// Short human-readable description used in finding messages.
    pub fn describe(&self) -> String {
        match self {
            AttributeType::String => "string".to_string(),
            AttributeType::Number => "number".to_string(),
            AttributeType::Integer => "integer".to_string(),
            AttributeType::Boolean => "boolean".to_string(),
            AttributeType::Enum { values } => format!("one of [{}]", values.join(", ")),
        }
    }
}

/// Declaration of one attribute in an entity's schema.
///
/// A `continuous` attribute must not change between scenes unless the later
/// scene carries the narrative marker flag.
///
/// ```
/// use scenecheck_core::{AttributeSpec, AttributeType};
///
/// let spec: AttributeSpec =
///     serde_json::from_str(r#"{"type": "enum", "values": ["red", "blue"], "continuous": true}"#)
///         .unwrap();
/// assert!(*spec.continuous());
/// assert!(spec.value_type().accepts(&serde_json::json!("red")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct AttributeSpec {
    #[serde(flatten)]
    value_type: AttributeType,
    #[serde(default)]
    continuous: bool,
}

impl AttributeSpec {
    /// An attribute that may change freely.
    pub fn new(value_type: AttributeType) -> Self {
        Self {
            value_type,
            continuous: false,
        }
    }

    /// An attribute that must stay constant without a narrative marker.
    pub fn new_continuous(value_type: AttributeType) -> Self {
        Self {
            value_type,
            continuous: true,
        }
    }
}

/// Attribute name to declaration.
pub type AttributeSchema = BTreeMap<String, AttributeSpec>;

/// A recurring character, prop or location tracked across scenes.
///
/// Entities are never deleted, only deactivated, so older reports stay
/// reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    attribute_schema: AttributeSchema,
    /// Scene in which the entity is meant to be introduced, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    introduced_in: Option<SceneId>,
    /// First scene that actually references the entity; filled in by the tracker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_appearance_scene_id: Option<SceneId>,
    #[serde(default = "default_active")]
    #[getter(skip)]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl Entity {
    /// Create an active entity with an empty schema.
    pub fn new(id: impl Into<EntityId>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            attribute_schema: AttributeSchema::new(),
            introduced_in: None,
            first_appearance_scene_id: None,
            active: true,
        }
    }

    /// Set a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attribute_schema.insert(name.into(), spec);
        self
    }

    /// Declare the scene that introduces this entity.
    pub fn with_introduction(mut self, scene: impl Into<SceneId>) -> Self {
        self.introduced_in = Some(scene.into());
        self
    }

    /// Whether the entity is part of the active vocabulary.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Soft-remove the entity.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Record (or clear) the first observed appearance.
    pub fn set_first_appearance(&mut self, scene: Option<SceneId>) {
        self.first_appearance_scene_id = scene;
    }

    /// Look up the declaration for an attribute.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attribute_schema.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_type_accepts() {
        assert!(AttributeType::String.accepts(&json!("red")));
        assert!(!AttributeType::String.accepts(&json!(3)));
        assert!(AttributeType::Integer.accepts(&json!(3)));
        assert!(!AttributeType::Integer.accepts(&json!(3.5)));
        assert!(AttributeType::Number.accepts(&json!(3.5)));
        assert!(AttributeType::Boolean.accepts(&json!(false)));

        let domain = AttributeType::Enum {
            values: vec!["day".to_string(), "night".to_string()],
        };
        assert!(domain.accepts(&json!("night")));
        assert!(!domain.accepts(&json!("dusk")));
    }

    #[test]
    fn test_entity_deserializes_with_defaults() {
        let entity: Entity = serde_json::from_value(json!({
            "id": "rex",
            "kind": "character",
            "attribute_schema": {
                "jacket": {"type": "string", "continuous": true}
            }
        }))
        .unwrap();

        assert!(entity.is_active());
        assert_eq!(*entity.kind(), EntityKind::Character);
        assert!(*entity.attribute("jacket").unwrap().continuous());
        assert!(entity.introduced_in().is_none());
    }
}
