use scenecheck_core::{Entity, EntityId, EntityKind, Scene, SceneId, ScenePatch};
use scenecheck_project::{ContinuityTracker, Project};
use serde_json::json;

fn sample_project() -> Project {
    let mut project = Project::new("pilot");
    project
        .register(Entity::new("rex", EntityKind::Character))
        .unwrap();
    project
        .register(Entity::new("lamp", EntityKind::Prop))
        .unwrap();
    project
        .insert_scene(
            Scene::new("s1", 1)
                .with_attributes("rex", [("jacket", json!("red")), ("hat", json!("fedora"))])
                .with_attributes("lamp", [("lit", json!(false))]),
        )
        .unwrap();
    project
        .insert_scene(Scene::new("s2", 2).with_attributes("rex", [("jacket", json!("red"))]))
        .unwrap();
    project
        .insert_scene(Scene::new("s3", 3).with_attributes("lamp", [("lit", json!(true))]))
        .unwrap();
    project
        .insert_scene(Scene::new("s4", 4).with_attributes("rex", [("jacket", json!("blue"))]))
        .unwrap();
    project
}

fn assert_matches_full_recompute(project: &Project) {
    let full = ContinuityTracker::from_store(project.store());
    assert_eq!(project.tracker(), &full);

    for entity in full.entities() {
        for scene in project.store().all_ordered() {
            assert_eq!(
                project
                    .tracker()
                    .state_at(project.store(), entity, scene.id())
                    .unwrap(),
                full.state_at(project.store(), entity, scene.id()).unwrap(),
                "state of {} at {}",
                entity,
                scene.id()
            );
        }
    }
}

#[test]
fn incremental_matches_full_after_insert() {
    let mut project = sample_project();
    project
        .insert_scene(Scene::new("s2b", 2).with_attributes("rex", [("jacket", json!("green"))]))
        .unwrap();
    assert_matches_full_recompute(&project);

    project
        .insert_scene(Scene::new("s0", 0).with_attributes("ghost", [("visible", json!(true))]))
        .unwrap();
    assert_matches_full_recompute(&project);
}

#[test]
fn incremental_matches_full_after_update() {
    let mut project = sample_project();
    project
        .update_scene(
            &SceneId::from("s2"),
            ScenePatch::new()
                .attribute("rex", "hat", Some(json!("cap")))
                .attribute("lamp", "lit", None),
        )
        .unwrap();
    assert_matches_full_recompute(&project);

    let state = project
        .tracker()
        .state_at(project.store(), &EntityId::from("rex"), &SceneId::from("s3"))
        .unwrap();
    assert_eq!(state["hat"], json!("cap"));
    assert_eq!(state["jacket"], json!("red"));
}

#[test]
fn incremental_matches_full_after_timestamp_rekey() {
    let mut project = sample_project();
    project
        .update_scene(&SceneId::from("s1"), ScenePatch::new().timestamp(100))
        .unwrap();
    project
        .insert_scene(
            Scene::new("s1b", 1)
                .with_timestamp(50)
                .with_attributes("rex", [("jacket", json!("grey"))]),
        )
        .unwrap();
    assert_matches_full_recompute(&project);

    let order: Vec<_> = project
        .store()
        .all_ordered()
        .map(|s| s.id().to_string())
        .collect();
    assert_eq!(order, ["s1b", "s1", "s2", "s3", "s4"]);
}

#[test]
fn incremental_matches_full_after_reorder() {
    let mut project = sample_project();
    project.reorder_scene(&SceneId::from("s4"), 0).unwrap();
    assert_matches_full_recompute(&project);

    project.reorder_scene(&SceneId::from("s1"), 10).unwrap();
    assert_matches_full_recompute(&project);

    let transitions = project
        .tracker()
        .transitions(&EntityId::from("rex"), "jacket")
        .unwrap();
    let pairs: Vec<_> = transitions
        .iter()
        .map(|t| (t.scene_from().as_str(), t.scene_to().as_str()))
        .collect();
    // Timeline is now s4(blue), s2(red), s1(red).
    assert_eq!(pairs, [("s4", "s2")]);
}

#[test]
fn transitions_report_old_and_new_values() {
    let project = sample_project();
    let transitions = project
        .tracker()
        .transitions(&EntityId::from("rex"), "jacket")
        .unwrap();

    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].scene_from().as_str(), "s2");
    assert_eq!(transitions[0].scene_to().as_str(), "s4");
    assert_eq!(transitions[0].old_value(), &json!("red"));
    assert_eq!(transitions[0].new_value(), &json!("blue"));
}
