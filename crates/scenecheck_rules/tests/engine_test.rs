use scenecheck_core::{
    AttributeSpec, AttributeType, Entity, EntityId, EntityKind, Finding, RuleDefinition, Scene,
    ValidationOptions,
};
use scenecheck_error::RuleErrorKind;
use scenecheck_project::{Project, ProjectSnapshot, TiePolicy, load_project};
use scenecheck_rules::{RuleEngine, RuleSet};
use serde_json::json;
use std::collections::BTreeMap;

fn scene(id: &str, sequence_index: i64) -> Scene {
    Scene::new(id, sequence_index).with_metadata("location", json!("diner"))
}

fn rex() -> Entity {
    Entity::new("rex", EntityKind::Character)
        .with_attribute("jacket", AttributeSpec::new_continuous(AttributeType::String))
}

fn evaluate(snapshot: &ProjectSnapshot, options: &ValidationOptions) -> Vec<Finding> {
    RuleEngine::new(RuleSet::defaults()).evaluate(snapshot, options)
}

fn by_rule<'a>(findings: &'a [Finding], rule: &str) -> Vec<&'a Finding> {
    findings
        .iter()
        .filter(|finding| finding.rule_id().as_str() == rule)
        .collect()
}

#[test]
fn unexplained_jacket_change_is_one_continuity_finding() {
    let mut project = Project::new("pilot");
    project.register(rex()).unwrap();
    project
        .insert_scene(scene("A", 1).with_attributes("rex", [("jacket", json!("red"))]))
        .unwrap();
    project
        .insert_scene(scene("B", 2).with_attributes("rex", [("jacket", json!("blue"))]))
        .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert_eq!(findings.len(), 1, "{findings:#?}");

    let finding = &findings[0];
    assert_eq!(finding.rule_id().as_str(), "continuous-attribute");
    let scenes: Vec<_> = finding.scene_ids().iter().map(|s| s.as_str()).collect();
    assert_eq!(scenes, ["A", "B"]);
    assert_eq!(finding.entity_id().as_ref().unwrap().as_str(), "rex");
    assert!(finding.suggested_fix().is_some());
}

#[test]
fn continuity_marker_explains_change() {
    let mut project = Project::new("pilot");
    project.register(rex()).unwrap();
    project
        .insert_scene(scene("A", 1).with_attributes("rex", [("jacket", json!("red"))]))
        .unwrap();
    project
        .insert_scene(
            scene("B", 2)
                .with_attributes("rex", [("jacket", json!("blue"))])
                .with_flag("continuity_break"),
        )
        .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert!(findings.is_empty(), "{findings:#?}");
}

#[test]
fn backwards_timestamp_respects_strict_ordering() {
    let mut project = Project::new("pilot");
    project
        .insert_scene(scene("c", 3).with_timestamp(10))
        .unwrap();
    project.insert_scene(scene("d", 4).with_timestamp(5)).unwrap();
    let snapshot = project.snapshot().unwrap();

    let strict = evaluate(&snapshot, &ValidationOptions::default().with_strict_ordering(true));
    let ordering = by_rule(&strict, "timestamp-order");
    assert_eq!(strict.len(), 1);
    assert_eq!(ordering.len(), 1);
    assert_eq!(*ordering[0].severity(), scenecheck_core::Severity::Warning);

    let relaxed = evaluate(&snapshot, &ValidationOptions::default().with_strict_ordering(false));
    assert!(relaxed.is_empty(), "{relaxed:#?}");
}

#[test]
fn unregistered_early_reference_is_one_unknown_entity_finding() {
    let mut project = Project::new("pilot");
    project
        .insert_scene(scene("s1", 1).with_attributes("ghost", [("visible", json!(true))]))
        .unwrap();
    project
        .insert_scene(scene("s2", 2).with_attributes("ghost", [("visible", json!(true))]))
        .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].rule_id().as_str(), "unknown-entity");
    assert_eq!(findings[0].scene_ids().len(), 2);
}

#[test]
fn registered_early_reference_is_one_use_before_introduction_finding() {
    let mut project = Project::new("pilot");
    project
        .register(Entity::new("ghost", EntityKind::Character).with_introduction("s2"))
        .unwrap();
    project
        .insert_scene(scene("s1", 1).with_attributes("ghost", [("visible", json!(true))]))
        .unwrap();
    project
        .insert_scene(scene("s2", 2).with_attributes("ghost", [("visible", json!(true))]))
        .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].rule_id().as_str(), "use-before-introduction");
    let scenes: Vec<_> = findings[0].scene_ids().iter().map(|s| s.as_str()).collect();
    assert_eq!(scenes, ["s1", "s2"]);
}

#[test]
fn attribute_carried_forward_before_it_is_set_is_use_before_introduction() {
    let mut project = Project::new("pilot");
    project.register(rex()).unwrap();
    project
        .insert_scene(scene("s1", 1).with_attributes("rex", [("jacket", json!(null))]))
        .unwrap();
    project
        .insert_scene(scene("s2", 2).with_attributes("rex", [("jacket", json!("red"))]))
        .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].rule_id().as_str(), "use-before-introduction");
    let scenes: Vec<_> = findings[0].scene_ids().iter().map(|s| s.as_str()).collect();
    assert_eq!(scenes, ["s1"]);
    assert_eq!(findings[0].entity_id().as_ref().unwrap().as_str(), "rex");
    assert!(findings[0].message().contains("jacket"));
}

#[test]
fn inherited_attribute_after_it_is_set_is_clean() {
    let mut project = Project::new("pilot");
    project.register(rex()).unwrap();
    project
        .insert_scene(scene("s1", 1).with_attributes("rex", [("jacket", json!("red"))]))
        .unwrap();
    project
        .insert_scene(scene("s2", 2).with_attributes("rex", [("jacket", json!(null))]))
        .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert!(findings.is_empty(), "{findings:#?}");
}

#[test]
fn deactivated_entity_references_are_reported() {
    let mut project = Project::new("pilot");
    project.register(rex()).unwrap();
    project
        .insert_scene(scene("s1", 1).with_attributes("rex", [("jacket", json!("red"))]))
        .unwrap();
    project.deactivate(&EntityId::from("rex")).unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    let unknown = by_rule(&findings, "unknown-entity");
    assert_eq!(unknown.len(), 1);
    assert!(unknown[0].message().contains("deactivated"));
}

#[test]
fn structural_checks_cover_metadata_and_schema() {
    let mut project = Project::new("pilot");
    project.register(rex()).unwrap();
    project
        .insert_scene(
            Scene::new("s1", 1)
                .with_metadata("location", json!(""))
                .with_attributes("rex", [("jacket", json!(3)), ("shoes", json!("boots"))]),
        )
        .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert_eq!(by_rule(&findings, "required-metadata").len(), 1);
    assert_eq!(by_rule(&findings, "attribute-schema").len(), 2);
    // Structural findings come before everything else.
    assert_eq!(findings[0].rule_id().as_str(), "required-metadata");
}

#[test]
fn load_issues_become_structural_findings() {
    let project = load_project(
        "pilot",
        r#"{
            "entities": [],
            "scenes": [
                {"id": "s1", "sequence_index": 1, "metadata": {"location": "diner"}},
                {"id": "s1", "sequence_index": 2, "metadata": {"location": "diner"}},
                {"id": "s3", "sequence_index": null}
            ]
        }"#,
        TiePolicy::InsertionOrder,
    )
    .unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert_eq!(by_rule(&findings, "malformed-scene").len(), 1);
    assert_eq!(by_rule(&findings, "duplicate-scene-id").len(), 1);
    assert_eq!(findings.len(), 2, "{findings:#?}");
}

#[test]
fn shared_sequence_index_is_informational() {
    let mut project = Project::new("pilot");
    project.insert_scene(scene("a", 1)).unwrap();
    project.insert_scene(scene("b", 1)).unwrap();

    let findings = evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id().as_str(), "shared-sequence-index");
    assert_eq!(*findings[0].severity(), scenecheck_core::Severity::Info);
}

#[test]
fn evaluation_is_deterministic() {
    let mut project = Project::new("pilot");
    project.register(rex()).unwrap();
    for (i, jacket) in ["red", "blue", "red", "green"].iter().enumerate() {
        project
            .insert_scene(
                Scene::new(format!("s{i}"), i as i64)
                    .with_attributes("rex", [("jacket", json!(jacket))])
                    .with_attributes("ghost", [("mood", json!("sad"))]),
            )
            .unwrap();
    }
    let snapshot = project.snapshot().unwrap();
    let options = ValidationOptions::default();

    let first = evaluate(&snapshot, &options);
    let second = evaluate(&snapshot, &options);
    assert_eq!(first, second);
    assert_eq!(by_rule(&first, "continuous-attribute").len(), 3);
}

#[test]
fn mismatched_category_is_rejected() {
    let definition: RuleDefinition = serde_json::from_value(json!({
        "category": "ordering",
        "severity": "error",
        "scope": "entity_timeline",
        "check": "continuous_attribute"
    }))
    .unwrap();
    let mut definitions = BTreeMap::new();
    definitions.insert("my-rule".to_string(), definition);

    let err = RuleSet::from_definitions(definitions).unwrap_err();
    assert!(matches!(err.kind(), RuleErrorKind::CategoryMismatch { rule, .. } if rule == "my-rule"));
}

#[test]
fn disabled_rules_do_not_fire() {
    let mut overrides = BTreeMap::new();
    overrides.insert(
        "shared-sequence-index".to_string(),
        RuleDefinition::new(
            scenecheck_core::RulePredicate::SharedSequenceIndex,
            scenecheck_core::Severity::Info,
        )
        .with_enabled(false),
    );
    let rules = RuleSet::defaults().with_overrides(overrides).unwrap();

    let mut project = Project::new("pilot");
    project.insert_scene(scene("a", 1)).unwrap();
    project.insert_scene(scene("b", 1)).unwrap();

    let findings = RuleEngine::new(rules).evaluate(&project.snapshot().unwrap(), &ValidationOptions::default());
    assert!(findings.is_empty());
}
