//! Canonical store of named entities.

use scenecheck_core::{Entity, EntityId, EntityKind, SceneId};
use scenecheck_error::{RegistryError, RegistryErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Entity vocabulary of one project.
///
/// Entities are keyed by id, so the registry state does not depend on the
/// order in which entities were registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity.
    ///
    /// Registering over a deactivated entity replaces it.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntity` if an active entity with the same id exists.
    #[instrument(skip(self, entity), fields(entity = %entity.id()))]
    pub fn register(&mut self, entity: Entity) -> Result<(), RegistryError> {
        if self.is_active(entity.id()) {
            return Err(RegistryError::new(RegistryErrorKind::DuplicateEntity(
                entity.id().to_string(),
            )));
        }
        debug!(kind = %entity.kind(), "Registered entity");
        self.entities.insert(entity.id().clone(), entity);
        Ok(())
    }

    /// Look up an entity, active or not.
    pub fn get(&self, id: &EntityId) -> Result<&Entity, RegistryError> {
        self.entities
            .get(id)
            .ok_or_else(|| RegistryError::new(RegistryErrorKind::NotFound(id.to_string())))
    }

    /// Soft-remove an entity. It stays in the registry for reproducibility.
    #[instrument(skip(self), fields(entity = %id))]
    pub fn deactivate(&mut self, id: &EntityId) -> Result<(), RegistryError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| RegistryError::new(RegistryErrorKind::NotFound(id.to_string())))?;
        entity.deactivate();
        debug!("Deactivated entity");
        Ok(())
    }

    /// Active entities, optionally of one kind, in id order.
    pub fn list_active(&self, kind: Option<EntityKind>) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|entity| entity.is_active())
            .filter(|entity| kind.is_none_or(|k| *entity.kind() == k))
            .collect()
    }

    /// Whether `id` names an active entity.
    pub fn is_active(&self, id: &EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::is_active)
    }

    /// All entities, active or not, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of entities, active or not.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn set_first_appearance(&mut self, id: &EntityId, scene: Option<SceneId>) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.set_first_appearance(scene);
        }
    }

    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().cloned().collect()
    }
}
