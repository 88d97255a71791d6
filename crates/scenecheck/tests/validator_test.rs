use async_trait::async_trait;
use scenecheck::{
    AnalysisRequest, AnalyzerResult, AttributeSpec, AttributeType, Entity, EntityKind, Finding,
    Project, ProjectHandle, RuleSet, SEMANTIC_UNAVAILABLE_RULE, Scene, SceneId, ScenePatch,
    SceneCheckConfig, SemanticAnalyzer, SemanticDispatcher, Severity, ValidationOptions,
    Validator, is_retryable, validate,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Never answers within any reasonable timeout.
struct StalledAnalyzer;

#[async_trait]
impl SemanticAnalyzer for StalledAnalyzer {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> AnalyzerResult<Vec<Finding>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

fn scene(id: &str, sequence_index: i64) -> Scene {
    Scene::new(id, sequence_index).with_metadata("location", json!("diner"))
}

fn pilot() -> Project {
    let mut project = Project::new("pilot");
    project
        .register(
            Entity::new("rex", EntityKind::Character)
                .with_attribute("jacket", AttributeSpec::new_continuous(AttributeType::String)),
        )
        .unwrap();
    project
        .insert_scene(
            scene("A", 1)
                .with_attributes("rex", [("jacket", json!("red"))])
                .with_description("Rex walks into the diner."),
        )
        .unwrap();
    project
        .insert_scene(
            scene("B", 2)
                .with_attributes("rex", [("jacket", json!("blue"))])
                .with_description("Rex orders pie."),
        )
        .unwrap();
    project
}

#[tokio::test]
async fn repeated_validation_is_identical() {
    let project = pilot();
    let validator = Validator::new(RuleSet::defaults());
    let options = ValidationOptions::default();

    let first_snapshot = project.snapshot().unwrap();
    let second_snapshot = project.snapshot().unwrap();
    assert_eq!(first_snapshot.version(), second_snapshot.version());

    let first = validator.validate(&first_snapshot, &options).await;
    let second = validator.validate(&second_snapshot, &options).await;
    assert_eq!(first.findings(), second.findings());
    assert_eq!(first.summary(), second.summary());
    assert_eq!(
        first.source_project_version(),
        second.source_project_version()
    );
    assert_eq!(first.summary().errors(), &1);
    assert!(!first.is_clean());
}

#[tokio::test]
async fn stalled_analyzer_degrades_to_warnings() {
    let project = pilot();
    let validator = Validator::new(RuleSet::defaults())
        .with_dispatcher(SemanticDispatcher::new(Arc::new(StalledAnalyzer)));
    let options = ValidationOptions::default()
        .with_semantic_analysis_enabled(true)
        .with_semantic_timeout_ms(50);

    let report = validator
        .validate(&project.snapshot().unwrap(), &options)
        .await;

    let unavailable: Vec<_> = report
        .findings()
        .iter()
        .filter(|f| f.rule_id().as_str() == SEMANTIC_UNAVAILABLE_RULE)
        .collect();
    assert_eq!(unavailable.len(), 2);
    assert!(unavailable.iter().all(|f| *f.severity() == Severity::Warning));

    // Rule findings are unaffected
    assert_eq!(report.findings()[0].rule_id().as_str(), "continuous-attribute");
    assert_eq!(report.summary().warnings(), &2);
}

#[tokio::test]
async fn semantic_without_analyzer_reports_once() {
    let project = pilot();
    let validator = Validator::new(RuleSet::defaults());
    let options = ValidationOptions::default().with_semantic_analysis_enabled(true);

    let report = validator
        .validate(&project.snapshot().unwrap(), &options)
        .await;
    let unavailable = report
        .findings()
        .iter()
        .filter(|f| f.rule_id().as_str() == SEMANTIC_UNAVAILABLE_RULE)
        .count();
    assert_eq!(unavailable, 1);
}

#[tokio::test]
async fn handle_validation_sees_snapshot_content() {
    let handle = ProjectHandle::new(pilot());
    let validator = Validator::new(RuleSet::defaults());
    let options = ValidationOptions::default();

    let before = validator.validate_handle(&handle, &options).await.unwrap();
    handle
        .mutate(|project| {
            project.update_scene(
                &SceneId::from("B"),
                ScenePatch::new().flag("continuity_break"),
            )
        })
        .await
        .unwrap();
    let after = validator.validate_handle(&handle, &options).await.unwrap();

    assert!(!before.is_clean());
    assert!(after.is_clean());
    assert_ne!(
        before.source_project_version(),
        after.source_project_version()
    );
}

#[tokio::test]
async fn backwards_timestamp_follows_strict_ordering() {
    let mut project = Project::new("pilot");
    project
        .insert_scene(scene("c", 3).with_timestamp(10))
        .unwrap();
    project
        .insert_scene(scene("d", 4).with_timestamp(5))
        .unwrap();
    let snapshot = project.snapshot().unwrap();
    let rules = RuleSet::defaults();

    let strict = validate(&snapshot, &rules, &ValidationOptions::default()).await;
    assert_eq!(strict.findings().len(), 1);
    assert_eq!(strict.findings()[0].rule_id().as_str(), "timestamp-order");
    assert_eq!(*strict.findings()[0].severity(), Severity::Warning);
    assert!(strict.is_clean());

    let lenient = validate(
        &snapshot,
        &rules,
        &ValidationOptions::default().with_strict_ordering(false),
    )
    .await;
    assert!(lenient.findings().is_empty());
}

#[tokio::test]
async fn locked_project_is_retryable_and_config_errors_are_not() {
    let handle = ProjectHandle::new(pilot());
    let writer = handle.clone();

    let err = handle
        .read(|_| writer.try_mutate(|_| Ok(())))
        .await
        .unwrap_err();
    assert!(is_retryable(err.kind()));

    let err = SceneCheckConfig::from_file("/nonexistent/scenecheck.toml").unwrap_err();
    assert!(!is_retryable(err.kind()));
}
