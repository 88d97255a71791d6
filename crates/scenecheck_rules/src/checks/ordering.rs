//! Scene-pair checks along the timeline.

use super::CheckContext;
use scenecheck_core::{Finding, Scene};

/// Story timestamps that go backwards between consecutive timestamped scenes.
pub(crate) fn timestamp_order(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut previous: Option<(&Scene, i64)> = None;

    for scene in ctx.snapshot.store().all_ordered() {
        let Some(timestamp) = *scene.timestamp() else {
            continue;
        };
        if let Some((before, before_ts)) = previous.filter(|(_, before_ts)| timestamp < *before_ts) {
            findings.push(
                ctx.finding(format!(
                    "Scene '{}' (timestamp {}) follows scene '{}' (timestamp {})",
                    scene.id(),
                    timestamp,
                    before.id(),
                    before_ts
                ))
                .with_scenes([before.id().clone(), scene.id().clone()])
                .with_fix(format!(
                    "Mark '{}' as a flashback or move it before '{}'",
                    scene.id(),
                    before.id()
                )),
            );
        }
        previous = Some((scene, timestamp));
    }
    findings
}

/// Scenes sharing a sequence index, resolved by timestamp and insertion order.
pub(crate) fn shared_sequence_index(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut groups: Vec<(i64, Vec<&Scene>)> = Vec::new();
    for scene in ctx.snapshot.store().all_ordered() {
        match groups.last_mut() {
            Some((index, members)) if *index == *scene.sequence_index() => members.push(scene),
            _ => groups.push((*scene.sequence_index(), vec![scene])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(index, members)| {
            let names = members
                .iter()
                .map(|scene| format!("'{}'", scene.id()))
                .collect::<Vec<_>>()
                .join(", ");
            ctx.finding(format!(
                "Scenes {} share sequence index {}; they are ordered by timestamp, then insertion",
                names, index
            ))
            .with_scenes(members.iter().map(|scene| scene.id().clone()))
            .with_fix("Give each scene its own sequence index to make the order explicit")
        })
        .collect()
}
