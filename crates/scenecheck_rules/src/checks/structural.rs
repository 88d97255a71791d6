//! Single-scene checks over the raw scene store and registry.

use super::CheckContext;
use scenecheck_core::{AttributeType, Finding, SceneId};
use scenecheck_project::LoadIssue;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Entries of the input document that could not be read.
pub(crate) fn malformed_entries(ctx: &CheckContext<'_>) -> Vec<Finding> {
    ctx.snapshot
        .load_issues()
        .iter()
        .filter_map(|issue| match issue {
            LoadIssue::MalformedScene {
                index,
                scene_id,
                reason,
            } => Some(
                ctx.finding(format!("Scene entry #{} could not be read: {}", index, reason))
                    .with_scenes(scene_id.clone())
                    .with_fix("Correct the entry so it has an id, an integer sequence_index and well-formed fields"),
            ),
            LoadIssue::MalformedEntity {
                index,
                entity_id,
                reason,
            } => {
                let finding = ctx
                    .finding(format!("Entity entry #{} could not be registered: {}", index, reason))
                    .with_fix("Correct the entity entry or give it a unique id");
                Some(match entity_id {
                    Some(id) => finding.with_entity(id.clone()),
                    None => finding,
                })
            }
            LoadIssue::DuplicateScene { .. } => None,
        })
        .collect()
}

/// Scene ids repeated in the input document.
pub(crate) fn duplicate_scene_ids(ctx: &CheckContext<'_>) -> Vec<Finding> {
    ctx.snapshot
        .load_issues()
        .iter()
        .filter_map(|issue| match issue {
            LoadIssue::DuplicateScene { index, scene_id } => Some(
                ctx.finding(format!(
                    "Scene id '{}' is used more than once; entry #{} was skipped",
                    scene_id, index
                ))
                .with_scenes([scene_id.clone()])
                .with_fix(format!("Rename the duplicate '{}' scene", scene_id)),
            ),
            _ => None,
        })
        .collect()
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(text) => text.trim().is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Metadata fields every scene must carry, optionally with expected types.
pub(crate) fn required_metadata(
    ctx: &CheckContext<'_>,
    fields: &[String],
    types: &BTreeMap<String, AttributeType>,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for scene in ctx.snapshot.store().all_ordered() {
        for field in fields {
            match scene.metadata().get(field) {
                Some(value) if !is_blank(value) => {}
                _ => findings.push(
                    ctx.finding(format!(
                        "Scene '{}' is missing required metadata field '{}'",
                        scene.id(),
                        field
                    ))
                    .with_scenes([scene.id().clone()])
                    .with_fix(format!("Add a non-empty '{}' to scene '{}'", field, scene.id())),
                ),
            }
        }
        for (field, expected) in types {
            let Some(value) = scene.metadata().get(field) else {
                continue;
            };
            if !expected.accepts(value) {
                findings.push(
                    ctx.finding(format!(
                        "Metadata field '{}' of scene '{}' should be {}, found {}",
                        field,
                        scene.id(),
                        expected.describe(),
                        value
                    ))
                    .with_scenes([scene.id().clone()])
                    .with_fix(format!("Change '{}' to {}", field, expected.describe())),
                );
            }
        }
    }
    findings
}

/// References to entities outside the active vocabulary, one finding per entity.
pub(crate) fn unknown_entities(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let registry = ctx.snapshot.registry();
    let tracker = ctx.snapshot.tracker();

    tracker
        .entities()
        .filter(|entity| !registry.is_active(entity))
        .filter_map(|entity| {
            let timeline = tracker.timeline(entity).ok()?;
            let scenes: Vec<SceneId> = timeline
                .entries()
                .iter()
                .map(|entry| entry.scene_id().clone())
                .collect();
            let (message, fix) = if registry.get(entity).is_ok() {
                (
                    format!(
                        "Entity '{}' is deactivated but referenced in {} scene(s)",
                        entity,
                        scenes.len()
                    ),
                    format!("Reactivate '{}' or remove its references", entity),
                )
            } else {
                (
                    format!(
                        "Entity '{}' is referenced in {} scene(s) but never registered",
                        entity,
                        scenes.len()
                    ),
                    format!("Register '{}' or fix the reference spelling", entity),
                )
            };
            Some(
                ctx.finding(message)
                    .with_scenes(scenes)
                    .with_entity(entity.clone())
                    .with_fix(fix),
            )
        })
        .collect()
}

/// Snapshot values checked against each registered entity's attribute schema.
///
/// Undeclared attributes are reported only for entities that declare a schema.
pub(crate) fn attribute_schema(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let registry = ctx.snapshot.registry();
    let mut findings = Vec::new();

    for scene in ctx.snapshot.store().all_ordered() {
        for (entity_id, snapshot) in scene.entity_refs() {
            let Ok(entity) = registry.get(entity_id) else {
                continue;
            };
            if !entity.is_active() {
                continue;
            }
            for (name, value) in snapshot {
                let Some(value) = value else { continue };
                match entity.attribute(name) {
                    Some(spec) if !spec.value_type().accepts(value) => findings.push(
                        ctx.finding(format!(
                            "Attribute '{}' of '{}' in scene '{}' should be {}, found {}",
                            name,
                            entity_id,
                            scene.id(),
                            spec.value_type().describe(),
                            value
                        ))
                        .with_scenes([scene.id().clone()])
                        .with_entity(entity_id.clone())
                        .with_fix(format!("Use {} for '{}'", spec.value_type().describe(), name)),
                    ),
                    None if !entity.attribute_schema().is_empty() => findings.push(
                        ctx.finding(format!(
                            "Attribute '{}' is not declared for '{}' (scene '{}')",
                            name,
                            entity_id,
                            scene.id()
                        ))
                        .with_scenes([scene.id().clone()])
                        .with_entity(entity_id.clone())
                        .with_fix(format!(
                            "Declare '{}' in the attribute schema of '{}' or remove it",
                            name, entity_id
                        )),
                    ),
                    _ => {}
                }
            }
        }
    }
    findings
}
