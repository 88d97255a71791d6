//! Entity-timeline checks that read the continuity tracker.

use super::CheckContext;
use scenecheck_core::{Entity, Finding};
use tracing::debug;

/// Changes of `continuous` attributes into scenes that lack `marker`.
pub(crate) fn continuous_attribute(ctx: &CheckContext<'_>, marker: &str) -> Vec<Finding> {
    let registry = ctx.snapshot.registry();
    let store = ctx.snapshot.store();
    let tracker = ctx.snapshot.tracker();
    let mut findings = Vec::new();

    for entity_id in tracker.entities() {
        let Ok(entity) = registry.get(entity_id) else {
            continue;
        };
        if !entity.is_active() {
            continue;
        }
        for (attribute, spec) in entity.attribute_schema() {
            if !*spec.continuous() {
                continue;
            }
            let Ok(transitions) = tracker.transitions(entity_id, attribute) else {
                continue;
            };
            for transition in transitions {
                let explained = store
                    .get(transition.scene_to())
                    .is_some_and(|scene| scene.has_flag(marker));
                if explained {
                    debug!(%entity_id, attribute, scene = %transition.scene_to(), "Change explained by marker");
                    continue;
                }
                findings.push(
                    ctx.finding(format!(
                        "'{}' of '{}' changes from {} to {} between scenes '{}' and '{}' without a '{}' marker",
                        attribute,
                        entity_id,
                        transition.old_value(),
                        transition.new_value(),
                        transition.scene_from(),
                        transition.scene_to(),
                        marker
                    ))
                    .with_scenes([transition.scene_from().clone(), transition.scene_to().clone()])
                    .with_entity(entity_id.clone())
                    .with_fix(format!(
                        "Restore '{}' to {} in scene '{}' or flag the scene with '{}'",
                        attribute,
                        transition.old_value(),
                        transition.scene_to(),
                        marker
                    )),
                );
            }
        }
    }
    findings
}

/// Registered entities referenced before their declared introduction scene,
/// and continuous attributes read before any scene establishes their value.
pub(crate) fn use_before_introduction(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for entity in ctx.snapshot.registry().list_active(None) {
        findings.extend(early_reference(ctx, entity));
        findings.extend(unestablished_attributes(ctx, entity));
    }
    findings
}

fn early_reference(ctx: &CheckContext<'_>, entity: &Entity) -> Option<Finding> {
    let introduction = entity.introduced_in().as_ref()?;
    let Some(introduced_at) = ctx.snapshot.store().key_of(introduction) else {
        return Some(
            ctx.finding(format!(
                "'{}' is declared to be introduced in scene '{}', which does not exist",
                entity.id(),
                introduction
            ))
            .with_entity(entity.id().clone())
            .with_fix(format!("Point introduced_in of '{}' at an existing scene", entity.id())),
        );
    };
    let timeline = ctx.snapshot.tracker().timeline(entity.id()).ok()?;
    let early: Vec<_> = timeline
        .entries()
        .iter()
        .take_while(|entry| *entry.key() < introduced_at)
        .map(|entry| entry.scene_id().clone())
        .collect();
    let first = early.first()?.clone();

    Some(
        ctx.finding(format!(
            "'{}' appears in {} scene(s) starting at '{}' before its introduction in '{}'",
            entity.id(),
            early.len(),
            first,
            introduction
        ))
        .with_scenes(early.into_iter().chain([introduction.clone()]))
        .with_entity(entity.id().clone())
        .with_fix(format!(
            "Move the introduction of '{}' to scene '{}' or remove the earlier references",
            entity.id(),
            first
        )),
    )
}

/// The first scene that names a continuous attribute must leave it with a value.
fn unestablished_attributes(ctx: &CheckContext<'_>, entity: &Entity) -> Vec<Finding> {
    let Ok(timeline) = ctx.snapshot.tracker().timeline(entity.id()) else {
        return Vec::new();
    };
    let mut findings = Vec::new();

    for (attribute, spec) in entity.attribute_schema() {
        if !*spec.continuous() {
            continue;
        }
        let Some(first) = timeline
            .entries()
            .iter()
            .find(|entry| entry.explicit().contains_key(attribute))
        else {
            continue;
        };
        if first.effective().contains_key(attribute) {
            continue;
        }
        debug!(entity = %entity.id(), attribute, scene = %first.scene_id(), "Attribute read before it is set");
        findings.push(
            ctx.finding(format!(
                "'{}' of '{}' is carried forward in scene '{}' before any scene sets it",
                attribute,
                entity.id(),
                first.scene_id()
            ))
            .with_scenes([first.scene_id().clone()])
            .with_entity(entity.id().clone())
            .with_fix(format!(
                "Give '{}' an explicit value for '{}' in scene '{}'",
                attribute,
                entity.id(),
                first.scene_id()
            )),
        );
    }
    findings
}
