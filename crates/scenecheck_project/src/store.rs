//! Ordered collection of scene records.

use scenecheck_core::{EntityId, OrderKey, Scene, SceneId, ScenePatch};
use scenecheck_error::{StoreError, StoreErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument};

/// How scenes sharing a sequence index are handled.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TiePolicy {
    /// Ties are ordered by timestamp, then by insertion order
    #[default]
    InsertionOrder,
    /// Placing a scene on an occupied sequence index fails
    Reject,
}

/// What a store mutation changed, for incremental recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneEdit {
    /// Earliest order position whose derived state may have changed
    pub dirty_from: OrderKey,
    /// Entities whose timelines need replay
    pub entities: BTreeSet<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
struct StoredScene {
    scene: Scene,
    insertion: u64,
}

impl StoredScene {
    fn key(&self) -> OrderKey {
        self.scene.order_key(self.insertion)
    }
}

/// Scenes keyed by id and ordered by `(sequence_index, timestamp, insertion)`.
///
/// The order index always holds every scene, so the store is totally ordered
/// after every operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneStore {
    scenes: HashMap<SceneId, StoredScene>,
    order: BTreeMap<OrderKey, SceneId>,
    next_insertion: u64,
    tie_policy: TiePolicy,
}

impl SceneStore {
    /// Create an empty store that breaks ties by insertion order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given tie policy.
    pub fn with_tie_policy(tie_policy: TiePolicy) -> Self {
        Self {
            tie_policy,
            ..Self::default()
        }
    }

    /// Tie policy in effect.
    pub fn tie_policy(&self) -> TiePolicy {
        self.tie_policy
    }

    /// Insert a new scene.
    ///
    /// # Errors
    ///
    /// - `DuplicateSceneId` if the id is taken
    /// - `SequenceConflict` under [`TiePolicy::Reject`] when the index is occupied
    #[instrument(skip(self, scene), fields(scene = %scene.id(), sequence_index = scene.sequence_index()))]
    pub fn insert(&mut self, scene: Scene) -> Result<SceneEdit, StoreError> {
        if self.scenes.contains_key(scene.id()) {
            return Err(StoreError::new(StoreErrorKind::DuplicateSceneId(
                scene.id().to_string(),
            )));
        }
        self.check_tie(scene.id(), *scene.sequence_index())?;

        let stored = StoredScene {
            scene,
            insertion: self.next_insertion,
        };
        self.next_insertion += 1;
        let key = stored.key();
        let id = stored.scene.id().clone();
        let entities = stored.scene.entity_refs().keys().cloned().collect();

        self.order.insert(key, id.clone());
        self.scenes.insert(id, stored);
        debug!(?key, "Inserted scene");

        Ok(SceneEdit {
            dirty_from: key,
            entities,
        })
    }

    /// Merge a patch into an existing scene.
    ///
    /// A timestamp change moves the scene along the timeline.
    #[instrument(skip(self, patch), fields(scene = %id))]
    pub fn update(&mut self, id: &SceneId, patch: ScenePatch) -> Result<SceneEdit, StoreError> {
        let stored = self
            .scenes
            .get_mut(id)
            .ok_or_else(|| StoreError::new(StoreErrorKind::SceneNotFound(id.to_string())))?;

        let old_key = stored.key();
        let rekeyed = patch
            .new_timestamp()
            .is_some_and(|ts| Some(ts) != *stored.scene.timestamp());
        let touched: BTreeSet<EntityId> = patch.touched_entities().cloned().collect();

        patch.apply(&mut stored.scene);
        let new_key = stored.key();

        let edit = if rekeyed {
            self.order.remove(&old_key);
            self.order.insert(new_key, id.clone());
            SceneEdit {
                dirty_from: old_key.min(new_key),
                entities: stored.scene.entity_refs().keys().cloned().collect(),
            }
        } else {
            SceneEdit {
                dirty_from: old_key,
                entities: touched,
            }
        };
        debug!(?old_key, ?new_key, entities = edit.entities.len(), "Updated scene");
        Ok(edit)
    }

    /// Move a scene to a new sequence index, keeping its insertion ordinal.
    ///
    /// # Errors
    ///
    /// - `SceneNotFound` if no such scene exists
    /// - `SequenceConflict` under [`TiePolicy::Reject`] when the index is occupied
    #[instrument(skip(self), fields(scene = %id))]
    pub fn reorder(&mut self, id: &SceneId, sequence_index: i64) -> Result<SceneEdit, StoreError> {
        if !self.scenes.contains_key(id) {
            return Err(StoreError::new(StoreErrorKind::SceneNotFound(
                id.to_string(),
            )));
        }
        self.check_tie(id, sequence_index)?;

        let Some(stored) = self.scenes.get_mut(id) else {
            return Err(StoreError::new(StoreErrorKind::SceneNotFound(
                id.to_string(),
            )));
        };
        let old_key = stored.key();
        stored.scene.set_sequence_index(sequence_index);
        let new_key = stored.key();

        self.order.remove(&old_key);
        self.order.insert(new_key, id.clone());
        debug!(?old_key, ?new_key, "Reordered scene");

        Ok(SceneEdit {
            dirty_from: old_key.min(new_key),
            entities: stored.scene.entity_refs().keys().cloned().collect(),
        })
    }

    /// Scenes in timeline order.
    ///
    /// The iterator borrows the store and can be cloned to restart the walk.
    pub fn all_ordered(&self) -> impl Iterator<Item = &Scene> + Clone + '_ {
        self.ordered().map(|(_, scene)| scene)
    }

    /// Scenes with their order keys, in timeline order.
    pub fn ordered(&self) -> impl Iterator<Item = (OrderKey, &Scene)> + Clone + '_ {
        self.order
            .iter()
            .filter_map(|(key, id)| self.scenes.get(id).map(|stored| (*key, &stored.scene)))
    }

    /// Scenes at or after `from`, in timeline order.
    pub fn ordered_from(
        &self,
        from: OrderKey,
    ) -> impl Iterator<Item = (OrderKey, &Scene)> + Clone + '_ {
        self.order
            .range(from..)
            .filter_map(|(key, id)| self.scenes.get(id).map(|stored| (*key, &stored.scene)))
    }

    /// Look up a scene.
    pub fn get(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.get(id).map(|stored| &stored.scene)
    }

    /// Current order key of a scene.
    pub fn key_of(&self, id: &SceneId) -> Option<OrderKey> {
        self.scenes.get(id).map(StoredScene::key)
    }

    /// Timeline rank of every scene, starting at zero.
    pub fn positions(&self) -> HashMap<SceneId, usize> {
        self.order
            .values()
            .enumerate()
            .map(|(rank, id)| (id.clone(), rank))
            .collect()
    }

    /// Whether a scene with this id exists.
    pub fn contains(&self, id: &SceneId) -> bool {
        self.scenes.contains_key(id)
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    fn check_tie(&self, id: &SceneId, sequence_index: i64) -> Result<(), StoreError> {
        if self.tie_policy == TiePolicy::InsertionOrder {
            return Ok(());
        }
        let occupant = self
            .order
            .range(OrderKey::new(sequence_index, None, 0)..)
            .take_while(|(key, _)| *key.sequence_index() == sequence_index)
            .map(|(_, occupant)| occupant)
            .find(|occupant| *occupant != id);
        match occupant {
            Some(occupant) => Err(StoreError::new(StoreErrorKind::SequenceConflict {
                scene: id.to_string(),
                sequence_index,
                occupant: occupant.to_string(),
            })),
            None => Ok(()),
        }
    }
}
