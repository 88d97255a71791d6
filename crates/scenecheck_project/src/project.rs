//! A project: entity vocabulary, scenes and the derived continuity state.

use crate::{ContinuityTracker, EntityRegistry, ProjectSnapshot, SceneEdit, SceneStore, TiePolicy};
use scenecheck_core::{Entity, EntityId, Scene, SceneId, ScenePatch};
use scenecheck_error::{SceneCheckResult, StoreErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Input problem recorded while loading a project document.
///
/// Load issues do not abort loading; the structural checks report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum LoadIssue {
    /// A scene entry that could not be read as a scene
    MalformedScene {
        /// Position in the document's scene list
        index: usize,
        /// Id, if the entry carried a readable one
        scene_id: Option<SceneId>,
        /// What was wrong
        reason: String,
    },
    /// A scene entry whose id was already used by an earlier entry
    DuplicateScene {
        /// Position in the document's scene list
        index: usize,
        /// The repeated id
        scene_id: SceneId,
    },
    /// An entity entry that could not be registered
    MalformedEntity {
        /// Position in the document's entity list
        index: usize,
        /// Id, if the entry carried a readable one
        entity_id: Option<EntityId>,
        /// What was wrong
        reason: String,
    },
}

/// Mutable state of one project.
///
/// Every mutation keeps the continuity tracker current by replaying only the
/// timelines the edit touched.
#[derive(Debug, Clone, Default)]
pub struct Project {
    id: String,
    registry: EntityRegistry,
    store: SceneStore,
    tracker: ContinuityTracker,
    load_issues: Vec<LoadIssue>,
}

impl Project {
    /// Create an empty project.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Create an empty project whose store uses `tie_policy`.
    pub fn with_tie_policy(id: impl Into<String>, tie_policy: TiePolicy) -> Self {
        Self {
            id: id.into(),
            store: SceneStore::with_tie_policy(tie_policy),
            ..Self::default()
        }
    }

    /// Project id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Entity vocabulary.
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Scene store.
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Continuity tracker.
    pub fn tracker(&self) -> &ContinuityTracker {
        &self.tracker
    }

    /// Problems recorded while loading.
    pub fn load_issues(&self) -> &[LoadIssue] {
        &self.load_issues
    }

    /// Register an entity.
    #[instrument(skip(self, entity), fields(project = %self.id, entity = %entity.id()))]
    pub fn register(&mut self, entity: Entity) -> SceneCheckResult<()> {
        let id = entity.id().clone();
        self.registry.register(entity)?;
        let first = self.tracker.first_appearance(&id).cloned();
        self.registry.set_first_appearance(&id, first);
        Ok(())
    }

    /// Soft-remove an entity.
    pub fn deactivate(&mut self, id: &EntityId) -> SceneCheckResult<()> {
        self.registry.deactivate(id)?;
        Ok(())
    }

    /// Insert a scene.
    #[instrument(skip(self, scene), fields(project = %self.id, scene = %scene.id()))]
    pub fn insert_scene(&mut self, scene: Scene) -> SceneCheckResult<()> {
        let edit = self.store.insert(scene)?;
        self.apply_edit(edit);
        Ok(())
    }

    /// Merge a patch into a scene.
    #[instrument(skip(self, patch), fields(project = %self.id, scene = %id))]
    pub fn update_scene(&mut self, id: &SceneId, patch: ScenePatch) -> SceneCheckResult<()> {
        let edit = self.store.update(id, patch)?;
        self.apply_edit(edit);
        Ok(())
    }

    /// Move a scene to a new sequence index.
    #[instrument(skip(self), fields(project = %self.id, scene = %id))]
    pub fn reorder_scene(&mut self, id: &SceneId, sequence_index: i64) -> SceneCheckResult<()> {
        let edit = self.store.reorder(id, sequence_index)?;
        self.apply_edit(edit);
        Ok(())
    }

    /// Freeze the current content into an immutable snapshot.
    pub fn snapshot(&self) -> SceneCheckResult<ProjectSnapshot> {
        ProjectSnapshot::capture(
            &self.id,
            self.registry.clone(),
            self.store.clone(),
            self.tracker.clone(),
            self.load_issues.clone(),
        )
    }

    pub(crate) fn record_issue(&mut self, issue: LoadIssue) {
        debug!(project = %self.id, ?issue, "Recorded load issue");
        self.load_issues.push(issue);
    }

    fn apply_edit(&mut self, edit: SceneEdit) {
        for entity in &edit.entities {
            self.tracker.mark_dirty(entity.clone(), edit.dirty_from);
        }
        self.tracker.refresh(&self.store);
        for entity in &edit.entities {
            let first = self.tracker.first_appearance(entity).cloned();
            self.registry.set_first_appearance(entity, first);
        }
    }

    /// Insert many scenes, then rebuild the tracker once.
    pub(crate) fn insert_bulk(&mut self, scenes: Vec<(usize, Scene)>) {
        for (index, scene) in scenes {
            let scene_id = scene.id().clone();
            if let Err(e) = self.store.insert(scene) {
                let issue = match e.kind() {
                    StoreErrorKind::DuplicateSceneId(_) => {
                        warn!(%scene_id, index, "Duplicate scene id in document");
                        LoadIssue::DuplicateScene { index, scene_id }
                    }
                    other => LoadIssue::MalformedScene {
                        index,
                        scene_id: Some(scene_id),
                        reason: other.to_string(),
                    },
                };
                self.record_issue(issue);
            }
        }
        self.rebuild();
    }

    /// Rebuild the tracker from scratch and resync first appearances.
    fn rebuild(&mut self) {
        self.tracker = ContinuityTracker::from_store(&self.store);
        for id in self.registry.ids() {
            let first = self.tracker.first_appearance(&id).cloned();
            self.registry.set_first_appearance(&id, first);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecheck_core::EntityKind;
    use serde_json::json;

    #[test]
    fn test_first_appearance_follows_reorder() {
        let mut project = Project::new("demo");
        project
            .register(Entity::new("rex", EntityKind::Character))
            .unwrap();
        project
            .insert_scene(Scene::new("a", 1).with_attributes("rex", [("hat", json!("fedora"))]))
            .unwrap();
        project
            .insert_scene(Scene::new("b", 2).with_attributes("rex", [("hat", json!("cap"))]))
            .unwrap();

        let rex = EntityId::from("rex");
        let first = |p: &Project| p.registry().get(&rex).unwrap().first_appearance_scene_id().clone();
        assert_eq!(first(&project), Some(SceneId::from("a")));

        project.reorder_scene(&SceneId::from("b"), 0).unwrap();
        assert_eq!(first(&project), Some(SceneId::from("b")));
    }

    #[test]
    fn test_registration_after_reference_picks_up_first_appearance() {
        let mut project = Project::new("demo");
        project
            .insert_scene(Scene::new("a", 1).with_attributes("lamp", [("lit", json!(true))]))
            .unwrap();
        project
            .register(Entity::new("lamp", EntityKind::Prop))
            .unwrap();

        let lamp = project.registry().get(&EntityId::from("lamp")).unwrap();
        assert_eq!(
            lamp.first_appearance_scene_id(),
            &Some(SceneId::from("a"))
        );
    }
}
