//! Per-entity attribute state along the ordered timeline.
//!
//! For every entity referenced by at least one scene, the tracker keeps a
//! timeline: one entry per referencing scene, in timeline order, carrying the
//! explicit snapshot from that scene and the effective state obtained by
//! carrying forward the last explicit value of each attribute.
//!
//! Edits do not trigger a full rescan. Each edit records a dirty-from marker
//! (the earliest invalidated order position) per affected entity, and
//! [`ContinuityTracker::refresh`] truncates those timelines at the marker and
//! replays the store forward from it.

use crate::SceneStore;
use derive_getters::Getters;
use scenecheck_core::{AttributeSnapshot, AttributeState, EntityId, OrderKey, Scene, SceneId};
use scenecheck_error::{TrackerError, TrackerErrorKind};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// One scene's contribution to an entity timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct TimelineEntry {
    scene_id: SceneId,
    key: OrderKey,
    explicit: AttributeSnapshot,
    effective: AttributeState,
}

/// Ordered timeline of one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityTimeline {
    entries: Vec<TimelineEntry>,
}

impl EntityTimeline {
    /// Entries in timeline order.
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Scene where the entity is first referenced.
    pub fn first_scene(&self) -> Option<&SceneId> {
        self.entries.first().map(|entry| &entry.scene_id)
    }

    fn push(&mut self, key: OrderKey, scene: &Scene, explicit: &AttributeSnapshot) {
        let mut effective = self
            .entries
            .last()
            .map(|entry| entry.effective.clone())
            .unwrap_or_default();
        for (name, value) in explicit {
            if let Some(value) = value {
                effective.insert(name.clone(), value.clone());
            }
        }
        self.entries.push(TimelineEntry {
            scene_id: scene.id().clone(),
            key,
            explicit: explicit.clone(),
            effective,
        });
    }

    fn truncate_from(&mut self, key: OrderKey) {
        let cut = self.entries.partition_point(|entry| entry.key < key);
        self.entries.truncate(cut);
    }
}

/// A change of an attribute's effective value between consecutive appearances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct Transition {
    scene_from: SceneId,
    scene_to: SceneId,
    old_value: JsonValue,
    new_value: JsonValue,
}

/// Derived attribute state of every referenced entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinuityTracker {
    timelines: BTreeMap<EntityId, EntityTimeline>,
    dirty: BTreeMap<EntityId, OrderKey>,
}

impl ContinuityTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every timeline from scratch.
    #[instrument(skip(store), fields(scenes = store.len()))]
    pub fn from_store(store: &SceneStore) -> Self {
        let mut timelines: BTreeMap<EntityId, EntityTimeline> = BTreeMap::new();
        for (key, scene) in store.ordered() {
            for (entity, explicit) in scene.entity_refs() {
                timelines
                    .entry(entity.clone())
                    .or_default()
                    .push(key, scene, explicit);
            }
        }
        debug!(entities = timelines.len(), "Built continuity timelines");
        Self {
            timelines,
            dirty: BTreeMap::new(),
        }
    }

    /// Record that `entity`'s timeline is stale from `from` onwards.
    ///
    /// Repeated marks keep the earliest position.
    pub fn mark_dirty(&mut self, entity: EntityId, from: OrderKey) {
        self.dirty
            .entry(entity)
            .and_modify(|marker| *marker = (*marker).min(from))
            .or_insert(from);
    }

    /// Whether any timeline awaits replay.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Replay every dirty timeline from its marker.
    #[instrument(skip_all, fields(dirty = self.dirty.len()))]
    pub fn refresh(&mut self, store: &SceneStore) {
        for (entity, marker) in std::mem::take(&mut self.dirty) {
            let timeline = self.timelines.entry(entity.clone()).or_default();
            timeline.truncate_from(marker);
            let kept = timeline.entries.len();

            for (key, scene) in store.ordered_from(marker) {
                if let Some(explicit) = scene.entity_refs().get(&entity) {
                    timeline.push(key, scene, explicit);
                }
            }
            debug!(
                %entity,
                kept,
                replayed = timeline.entries.len() - kept,
                "Replayed timeline"
            );

            if timeline.entries.is_empty() {
                self.timelines.remove(&entity);
            }
        }
    }

    /// Effective attributes of `entity` as of `scene`.
    ///
    /// Empty if the entity has not appeared at or before that scene.
    ///
    /// # Errors
    ///
    /// `UnknownScene` if the store has no such scene, `UnknownEntity` if no
    /// scene references the entity.
    pub fn state_at(
        &self,
        store: &SceneStore,
        entity: &EntityId,
        scene: &SceneId,
    ) -> Result<AttributeState, TrackerError> {
        if self.is_dirty() {
            warn!("Reading tracker state with pending replays");
        }
        let key = store
            .key_of(scene)
            .ok_or_else(|| TrackerError::new(TrackerErrorKind::UnknownScene(scene.to_string())))?;
        let timeline = self.timeline(entity)?;
        let seen = timeline.entries.partition_point(|entry| entry.key <= key);
        Ok(seen
            .checked_sub(1)
            .map(|last| timeline.entries[last].effective.clone())
            .unwrap_or_default())
    }

    /// Every change of `attribute`'s effective value along `entity`'s timeline.
    ///
    /// The first value an attribute takes is not a transition.
    pub fn transitions(
        &self,
        entity: &EntityId,
        attribute: &str,
    ) -> Result<Vec<Transition>, TrackerError> {
        let timeline = self.timeline(entity)?;
        Ok(timeline
            .entries
            .windows(2)
            .filter_map(|pair| {
                let old_value = pair[0].effective.get(attribute)?;
                let new_value = pair[1].effective.get(attribute)?;
                (old_value != new_value).then(|| Transition {
                    scene_from: pair[0].scene_id.clone(),
                    scene_to: pair[1].scene_id.clone(),
                    old_value: old_value.clone(),
                    new_value: new_value.clone(),
                })
            })
            .collect())
    }

    /// First scene referencing `entity`, if any.
    pub fn first_appearance(&self, entity: &EntityId) -> Option<&SceneId> {
        self.timelines
            .get(entity)
            .and_then(EntityTimeline::first_scene)
    }

    /// Timeline of one entity.
    pub fn timeline(&self, entity: &EntityId) -> Result<&EntityTimeline, TrackerError> {
        self.timelines
            .get(entity)
            .ok_or_else(|| TrackerError::new(TrackerErrorKind::UnknownEntity(entity.to_string())))
    }

    /// Entities with a timeline, in id order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.timelines.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_inherits_previous_value() {
        let mut store = SceneStore::new();
        store
            .insert(Scene::new("a", 1).with_attributes("rex", [("jacket", json!("red"))]))
            .unwrap();
        let mut inherit = AttributeSnapshot::new();
        inherit.insert("jacket".to_string(), None);
        store
            .insert(Scene::new("b", 2).with_entity("rex", inherit))
            .unwrap();

        let tracker = ContinuityTracker::from_store(&store);
        let state = tracker
            .state_at(&store, &EntityId::from("rex"), &SceneId::from("b"))
            .unwrap();
        assert_eq!(state["jacket"], json!("red"));
        assert!(
            tracker
                .transitions(&EntityId::from("rex"), "jacket")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_state_before_first_appearance_is_empty() {
        let mut store = SceneStore::new();
        store.insert(Scene::new("a", 1)).unwrap();
        store
            .insert(Scene::new("b", 2).with_attributes("rex", [("hat", json!("fedora"))]))
            .unwrap();

        let tracker = ContinuityTracker::from_store(&store);
        let rex = EntityId::from("rex");
        assert!(
            tracker
                .state_at(&store, &rex, &SceneId::from("a"))
                .unwrap()
                .is_empty()
        );
        assert_eq!(tracker.first_appearance(&rex), Some(&SceneId::from("b")));
    }

    #[test]
    fn test_unknown_ids_are_contract_errors() {
        let mut store = SceneStore::new();
        store.insert(Scene::new("a", 1)).unwrap();
        let tracker = ContinuityTracker::from_store(&store);

        let err = tracker
            .state_at(&store, &EntityId::from("rex"), &SceneId::from("a"))
            .unwrap_err();
        assert!(matches!(err.kind(), TrackerErrorKind::UnknownEntity(_)));

        let err = tracker
            .state_at(&store, &EntityId::from("rex"), &SceneId::from("zz"))
            .unwrap_err();
        assert!(matches!(err.kind(), TrackerErrorKind::UnknownScene(_)));
    }

    #[test]
    fn test_mark_dirty_keeps_earliest_marker() {
        let mut tracker = ContinuityTracker::new();
        let rex = EntityId::from("rex");
        tracker.mark_dirty(rex.clone(), OrderKey::new(5, None, 0));
        tracker.mark_dirty(rex.clone(), OrderKey::new(2, None, 3));
        tracker.mark_dirty(rex.clone(), OrderKey::new(9, None, 1));
        assert_eq!(tracker.dirty[&rex], OrderKey::new(2, None, 3));
    }
}
