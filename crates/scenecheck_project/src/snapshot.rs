//! Immutable, content-addressed view of a project.

use crate::{ContinuityTracker, EntityRegistry, LoadIssue, SceneStore};
use derive_getters::Getters;
use scenecheck_core::Scene;
use scenecheck_error::{JsonError, JsonErrorKind, SceneCheckResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Canonical serialization of everything findings depend on.
#[derive(Serialize)]
struct CanonicalContent<'a> {
    entities: &'a EntityRegistry,
    scenes: Vec<&'a Scene>,
    load_issues: &'a [LoadIssue],
}

/// Read-only project state that validation runs against.
///
/// `version` is the SHA-256 of a canonical serialization of the registry,
/// the ordered scenes and any load issues, so unchanged content always has
/// the same version.
#[derive(Debug, Clone, Getters)]
pub struct ProjectSnapshot {
    project_id: String,
    registry: EntityRegistry,
    store: SceneStore,
    tracker: ContinuityTracker,
    load_issues: Vec<LoadIssue>,
    version: String,
}

impl ProjectSnapshot {
    pub(crate) fn capture(
        project_id: &str,
        registry: EntityRegistry,
        store: SceneStore,
        tracker: ContinuityTracker,
        load_issues: Vec<LoadIssue>,
    ) -> SceneCheckResult<Self> {
        let version = content_hash(&registry, &store, &load_issues)?;
        debug!(project = project_id, %version, "Captured project snapshot");
        Ok(Self {
            project_id: project_id.to_string(),
            registry,
            store,
            tracker,
            load_issues,
            version,
        })
    }
}

fn content_hash(
    registry: &EntityRegistry,
    store: &SceneStore,
    load_issues: &[LoadIssue],
) -> SceneCheckResult<String> {
    let content = CanonicalContent {
        entities: registry,
        scenes: store.all_ordered().collect(),
        load_issues,
    };
    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut hasher, &content)
        .map_err(|e| JsonError::new(JsonErrorKind::SnapshotContent(e.to_string())))?;
    Ok(format!("{:x}", hasher.finalize()))
}
