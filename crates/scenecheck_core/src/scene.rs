//! Scenes, attribute snapshots and timeline ordering.

use crate::{EntityId, SceneId};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

/// Attribute values an entity shows in one scene.
///
/// A `None` value (JSON `null`) means "unspecified, inherit previous".
pub type AttributeSnapshot = BTreeMap<String, Option<JsonValue>>;

/// Effective attribute values after inheritance has been applied.
pub type AttributeState = BTreeMap<String, JsonValue>;

/// Total ordering key of a scene on the timeline.
///
/// Scenes sort by sequence index, then story timestamp (absent first), then the
/// order in which they were inserted into the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Getters,
)]
pub struct OrderKey {
    sequence_index: i64,
    timestamp: Option<i64>,
    insertion: u64,
}

impl OrderKey {
    /// Build a key from its parts.
    pub fn new(sequence_index: i64, timestamp: Option<i64>, insertion: u64) -> Self {
        Self {
            sequence_index,
            timestamp,
            insertion,
        }
    }

    /// Smallest possible key; every scene sorts at or after it.
    pub fn min() -> Self {
        Self::new(i64::MIN, None, 0)
    }
}

/// An ordered unit of project content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Scene {
    id: SceneId,
    sequence_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    #[serde(default)]
    entity_refs: BTreeMap<EntityId, AttributeSnapshot>,
    #[serde(default)]
    metadata: BTreeMap<String, JsonValue>,
    /// Narrative markers such as `continuity_break`.
    #[serde(default)]
    flags: BTreeSet<String>,
    /// Free text handed to the semantic analyzer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Scene {
    /// Create an empty scene at a sequence position.
    pub fn new(id: impl Into<SceneId>, sequence_index: i64) -> Self {
        Self {
            id: id.into(),
            sequence_index,
            timestamp: None,
            entity_refs: BTreeMap::new(),
            metadata: BTreeMap::new(),
            flags: BTreeSet::new(),
            description: None,
        }
    }

    /// Set the story timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Reference an entity with an attribute snapshot.
    pub fn with_entity(mut self, entity: impl Into<EntityId>, snapshot: AttributeSnapshot) -> Self {
        self.entity_refs.insert(entity.into(), snapshot);
        self
    }

    /// Reference an entity with attribute values. A JSON `null` inherits,
    /// as it does in a project document.
    pub fn with_attributes<I, K>(self, entity: impl Into<EntityId>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonValue)>,
        K: Into<String>,
    {
        let snapshot = attributes
            .into_iter()
            .map(|(name, value)| (name.into(), Some(value).filter(|v| !v.is_null())))
            .collect();
        self.with_entity(entity, snapshot)
    }

    /// Set a metadata field.
    pub fn with_metadata(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Add a narrative flag.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Set the scene description text.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Whether the scene carries a flag.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Move the scene to a new sequence position.
    pub fn set_sequence_index(&mut self, sequence_index: i64) {
        self.sequence_index = sequence_index;
    }

    /// Ordering key of this scene given its insertion ordinal.
    pub fn order_key(&self, insertion: u64) -> OrderKey {
        OrderKey::new(self.sequence_index, self.timestamp, insertion)
    }
}

/// Partial update of one scene.
///
/// Entity snapshots merge per attribute: values present in the patch overwrite,
/// attributes the patch omits keep their prior values for that scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    #[serde(default)]
    entity_refs: BTreeMap<EntityId, AttributeSnapshot>,
    #[serde(default)]
    metadata: BTreeMap<String, JsonValue>,
    #[serde(default)]
    flags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ScenePatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the story timestamp.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Overwrite one attribute of one entity (`None` resets it to inherit).
    pub fn attribute(
        mut self,
        entity: impl Into<EntityId>,
        name: impl Into<String>,
        value: Option<JsonValue>,
    ) -> Self {
        self.entity_refs
            .entry(entity.into())
            .or_default()
            .insert(name.into(), value);
        self
    }

    /// Overwrite one metadata field.
    pub fn metadata(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Add a narrative flag.
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Replace the description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Timestamp the patch will set, if any.
    pub fn new_timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Entities whose snapshot this patch touches.
    pub fn touched_entities(&self) -> impl Iterator<Item = &EntityId> {
        self.entity_refs.keys()
    }

    /// Merge the patch into `scene`.
    pub fn apply(self, scene: &mut Scene) {
        if let Some(timestamp) = self.timestamp {
            scene.timestamp = Some(timestamp);
        }
        for (entity, snapshot) in self.entity_refs {
            scene.entity_refs.entry(entity).or_default().extend(snapshot);
        }
        scene.metadata.extend(self.metadata);
        scene.flags.extend(self.flags);
        if let Some(text) = self.description {
            scene.description = Some(text);
        }
    }
}

/// A patch carrying everything a scene states. Merging it over an older
/// version of the same scene overwrites every value the newer one sets.
impl From<Scene> for ScenePatch {
    fn from(scene: Scene) -> Self {
        Self {
            timestamp: scene.timestamp,
            entity_refs: scene.entity_refs,
            metadata: scene.metadata,
            flags: scene.flags,
            description: scene.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_snapshot_value_means_inherit() {
        let scene: Scene = serde_json::from_value(json!({
            "id": "s1",
            "sequence_index": 1,
            "entity_refs": {"rex": {"jacket": null, "hat": "fedora"}}
        }))
        .unwrap();

        let snapshot = &scene.entity_refs()[&EntityId::from("rex")];
        assert_eq!(snapshot["jacket"], None);
        assert_eq!(snapshot["hat"], Some(json!("fedora")));
    }

    #[test]
    fn test_patch_merges_per_attribute() {
        let mut scene = Scene::new("s1", 1)
            .with_attributes("rex", [("jacket", json!("red")), ("hat", json!("fedora"))])
            .with_metadata("location", json!("diner"));

        ScenePatch::new()
            .attribute("rex", "jacket", Some(json!("blue")))
            .metadata("lighting", json!("dusk"))
            .flag("continuity_break")
            .apply(&mut scene);

        let snapshot = &scene.entity_refs()[&EntityId::from("rex")];
        assert_eq!(snapshot["jacket"], Some(json!("blue")));
        assert_eq!(snapshot["hat"], Some(json!("fedora")));
        assert_eq!(scene.metadata()["location"], json!("diner"));
        assert_eq!(scene.metadata()["lighting"], json!("dusk"));
        assert!(scene.has_flag("continuity_break"));
    }

    #[test]
    fn test_order_key_sorts_missing_timestamp_first() {
        let a = OrderKey::new(1, None, 5);
        let b = OrderKey::new(1, Some(0), 0);
        let c = OrderKey::new(2, None, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(OrderKey::min() <= a);
    }

    #[test]
    fn test_scene_as_patch_overwrites_older_version() {
        let mut older = Scene::new("s1", 1)
            .with_attributes("rex", [("jacket", json!("red")), ("hat", json!("fedora"))])
            .with_description("Rex waits.");
        let newer = Scene::new("s1", 1)
            .with_timestamp(40)
            .with_attributes("rex", [("jacket", json!("blue"))])
            .with_flag("flashback");

        ScenePatch::from(newer).apply(&mut older);

        let rex = &older.entity_refs()[&EntityId::from("rex")];
        assert_eq!(rex["jacket"], Some(json!("blue")));
        assert_eq!(rex["hat"], Some(json!("fedora")));
        assert_eq!(*older.timestamp(), Some(40));
        assert!(older.has_flag("flashback"));
        assert_eq!(older.description().as_deref(), Some("Rex waits."));
    }
}
