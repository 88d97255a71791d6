//! Project documents in JSON form.
//!
//! A document is an object with `entities` and `scenes` arrays:
//!
//! ```json
//! {
//!   "entities": [{"id": "rex", "kind": "character",
//!                 "attribute_schema": {"jacket": {"type": "string", "continuous": true}}}],
//!   "scenes": [{"id": "s1", "sequence_index": 1,
//!               "entity_refs": {"rex": {"jacket": "red"}},
//!               "metadata": {"location": "diner"}}]
//! }
//! ```
//!
//! Entries are read one at a time so a bad entry becomes a [`LoadIssue`]
//! instead of rejecting the whole document.

use crate::{LoadIssue, Project, TiePolicy};
use scenecheck_core::{Entity, EntityId, Scene, SceneId};
use scenecheck_error::{
    JsonError, JsonErrorKind, ProjectError, ProjectErrorKind, RegistryErrorKind,
    SceneCheckErrorKind, SceneCheckResult,
};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::{info, instrument};

/// Read a project document from a string.
///
/// # Errors
///
/// Fails only if the text is not JSON or lacks the top-level shape; problems
/// with individual entries are recorded as load issues.
#[instrument(skip(document))]
pub fn load_project(
    id: &str,
    document: &str,
    tie_policy: TiePolicy,
) -> SceneCheckResult<Project> {
    let root: JsonValue = serde_json::from_str(document)
        .map_err(|e| JsonError::new(JsonErrorKind::ProjectDocument(e.to_string())))?;
    let JsonValue::Object(mut root) = root else {
        return Err(invalid("top level must be an object").into());
    };
    let entities = take_array(&mut root, "entities")?;
    let scenes = take_array(&mut root, "scenes")?;

    let mut project = Project::with_tie_policy(id, tie_policy);

    for (index, raw) in entities.into_iter().enumerate() {
        let entity_id = raw.get("id").and_then(JsonValue::as_str).map(EntityId::from);
        match serde_json::from_value::<Entity>(raw) {
            Ok(entity) => {
                if let Err(e) = project.register(entity) {
                    let reason = match e.kind() {
                        SceneCheckErrorKind::Registry(err)
                            if matches!(err.kind(), RegistryErrorKind::DuplicateEntity(_)) =>
                        {
                            "entity id is declared more than once".to_string()
                        }
                        _ => e.to_string(),
                    };
                    project.record_issue(LoadIssue::MalformedEntity {
                        index,
                        entity_id,
                        reason,
                    });
                }
            }
            Err(e) => project.record_issue(LoadIssue::MalformedEntity {
                index,
                entity_id,
                reason: e.to_string(),
            }),
        }
    }

    // Scenes go in without per-insert replay; the tracker is rebuilt once below.
    let mut staged = Vec::new();
    for (index, raw) in scenes.into_iter().enumerate() {
        let scene_id = raw.get("id").and_then(JsonValue::as_str).map(SceneId::from);
        match serde_json::from_value::<Scene>(raw) {
            Ok(scene) => staged.push((index, scene)),
            Err(e) => project.record_issue(LoadIssue::MalformedScene {
                index,
                scene_id,
                reason: e.to_string(),
            }),
        }
    }
    project.insert_bulk(staged);

    info!(
        project = id,
        entities = project.registry().len(),
        scenes = project.store().len(),
        issues = project.load_issues().len(),
        "Loaded project"
    );
    Ok(project)
}

/// Read a project document from a file. The file stem becomes the project id.
pub fn load_project_file(path: impl AsRef<Path>, tie_policy: TiePolicy) -> SceneCheckResult<Project> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path).map_err(|e| {
        ProjectError::new(ProjectErrorKind::InvalidDocument(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;
    let id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    load_project(&id, &document, tie_policy)
}

fn take_array(
    root: &mut serde_json::Map<String, JsonValue>,
    field: &str,
) -> Result<Vec<JsonValue>, ProjectError> {
    match root.remove(field) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(items)) => Ok(items),
        Some(_) => Err(invalid(&format!("'{}' must be an array", field))),
    }
}

fn invalid(reason: &str) -> ProjectError {
    ProjectError::new(ProjectErrorKind::InvalidDocument(reason.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_entries_become_load_issues() {
        let project = load_project(
            "demo",
            r#"{
                "entities": [
                    {"id": "rex", "kind": "character"},
                    {"id": "rex", "kind": "prop"},
                    {"id": "lamp", "kind": "spaceship"}
                ],
                "scenes": [
                    {"id": "s1", "sequence_index": 1},
                    {"id": "s1", "sequence_index": 2},
                    {"id": "s3", "sequence_index": "three"}
                ]
            }"#,
            TiePolicy::InsertionOrder,
        )
        .unwrap();

        assert_eq!(project.registry().len(), 1);
        assert_eq!(project.store().len(), 1);
        let issues = project.load_issues();
        assert_eq!(issues.len(), 4);
        assert!(issues.contains(&LoadIssue::DuplicateScene {
            index: 1,
            scene_id: SceneId::from("s1"),
        }));
        assert!(issues.iter().any(|issue| matches!(
            issue,
            LoadIssue::MalformedScene { index: 2, scene_id: Some(id), .. } if id.as_str() == "s3"
        )));
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let err = load_project("demo", "[1, 2, 3]", TiePolicy::InsertionOrder).unwrap_err();
        assert!(matches!(err.kind(), SceneCheckErrorKind::Project(_)));

        let err = load_project("demo", "{not json", TiePolicy::InsertionOrder).unwrap_err();
        match err.kind() {
            SceneCheckErrorKind::Json(json) => {
                assert!(matches!(json.kind(), JsonErrorKind::ProjectDocument(_)))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
