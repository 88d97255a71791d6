use chrono::Utc;
use scenecheck_core::{
    Finding, Report, ReportSummary, RuleDefinition, RulePredicate, Severity, ValidationOptions,
};
use std::time::Duration;

#[test]
fn default_options_enforce_ordering_without_semantics() {
    let options = ValidationOptions::default();
    assert!(options.strict_ordering());
    assert!(!options.semantic_analysis_enabled());
    assert_eq!(options.semantic_timeout(), Duration::from_secs(30));
    assert_eq!(options.deadline(), None);
}

#[test]
fn options_builder_keeps_unset_defaults() {
    let options = ValidationOptions::builder()
        .semantic_analysis_enabled(true)
        .max_concurrent_semantic_calls(2usize)
        .build()
        .unwrap();

    assert!(options.semantic_analysis_enabled());
    assert!(options.strict_ordering());
    assert_eq!(*options.max_concurrent_semantic_calls(), 2);
}

#[test]
fn options_deserialize_with_partial_fields() {
    let options: ValidationOptions =
        serde_json::from_str(r#"{"strict_ordering": false, "deadline_ms": 500}"#).unwrap();
    assert!(!options.strict_ordering());
    assert_eq!(options.deadline(), Some(Duration::from_millis(500)));
    assert_eq!(*options.max_concurrent_semantic_calls(), 4);
}

#[test]
fn severity_orders_most_severe_first() {
    assert!(Severity::Error < Severity::Warning);
    assert!(Severity::Warning < Severity::Info);
    assert_eq!(Severity::Warning.to_string(), "warning");
}

#[test]
fn rule_definition_parses_required_metadata_parameters() {
    let def: RuleDefinition = serde_json::from_str(
        r#"{
            "category": "structural",
            "severity": "warning",
            "scope": "single_scene",
            "check": "required_metadata",
            "fields": ["location", "scene_id"],
            "priority": 5
        }"#,
    )
    .unwrap();

    assert_eq!(*def.priority(), 5);
    match def.predicate() {
        RulePredicate::RequiredMetadata { fields, types } => {
            assert_eq!(fields, &vec!["location".to_string(), "scene_id".to_string()]);
            assert!(types.is_empty());
        }
        other => panic!("unexpected predicate {other:?}"),
    }
}

#[test]
fn report_groups_findings_by_severity() {
    let findings = vec![
        Finding::new("continuous-attribute", Severity::Error, "jacket changed"),
        Finding::new("shared-sequence-index", Severity::Info, "shared index"),
        Finding::new("timestamp-order", Severity::Warning, "time went backwards"),
        Finding::new("unknown-entity", Severity::Error, "who is ghost"),
    ];
    let summary = ReportSummary::tally(&findings, 3, 2);
    let report = Report::new(Utc::now(), "abc", findings, summary);

    assert_eq!(*report.summary().errors(), 2);
    assert_eq!(*report.summary().warnings(), 1);
    assert_eq!(*report.summary().infos(), 1);
    assert!(!report.is_clean());

    let groups = report.by_severity();
    let order: Vec<_> = groups.keys().copied().collect();
    assert_eq!(order, vec![Severity::Error, Severity::Warning, Severity::Info]);
    assert_eq!(groups[&Severity::Error][0].message(), "jacket changed");
    assert_eq!(groups[&Severity::Error][1].message(), "who is ghost");
}
