use scenecheck::{
    ConfigErrorKind, ReportFormat, RuleErrorKind, RulePredicate, SceneCheckConfig,
    SceneCheckErrorKind, Severity, TiePolicy,
};
use std::io::Write;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn file_overrides_validation_and_rules() {
    let file = config_file(
        r#"
[validation]
strict_ordering = false
deadline_ms = 5000

[project]
tie_policy = "reject"

[report]
format = "markdown"

[rules.required-metadata]
category = "structural"
severity = "warning"
scope = "single_scene"
priority = 30
check = "required_metadata"
fields = ["location", "time_of_day"]

[rules.shared-sequence-index]
category = "ordering"
severity = "info"
scope = "scene_pair"
enabled = false
check = "shared_sequence_index"
"#,
    );

    let config = SceneCheckConfig::from_file(file.path()).unwrap();
    assert!(!config.validation.strict_ordering());
    assert_eq!(*config.validation.deadline_ms(), Some(5000));
    assert_eq!(*config.validation.max_concurrent_semantic_calls(), 4);
    assert_eq!(config.project.tie_policy, TiePolicy::Reject);
    assert_eq!(config.report.format, ReportFormat::Markdown);

    let rules = config.rule_set().unwrap();
    let required = rules.get("required-metadata").unwrap();
    assert_eq!(*required.definition().severity(), Severity::Warning);
    assert!(matches!(
        required.definition().predicate(),
        RulePredicate::RequiredMetadata { fields, .. } if fields.len() == 2
    ));
    assert!(!*rules.get("shared-sequence-index").unwrap().definition().enabled());
    // Untouched defaults survive
    assert!(rules.get("continuous-attribute").is_some());
}

#[test]
fn category_mismatch_is_rejected() {
    let file = config_file(
        r#"
[rules.timestamp-order]
category = "continuity"
severity = "warning"
scope = "entity_timeline"
check = "timestamp_order"
"#,
    );

    let config = SceneCheckConfig::from_file(file.path()).unwrap();
    let err = config.rule_set().unwrap_err();
    match err.kind() {
        SceneCheckErrorKind::Rule(rule) => {
            assert!(matches!(rule.kind(), RuleErrorKind::CategoryMismatch { .. }))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_config_error() {
    let err = SceneCheckConfig::from_file("/nonexistent/scenecheck.toml").unwrap_err();
    assert!(matches!(
        err.kind(),
        SceneCheckErrorKind::Config(config) if matches!(config.kind(), ConfigErrorKind::MissingFile(_))
    ));

    let err = SceneCheckConfig::load_with(Some("/nonexistent/scenecheck.toml")).unwrap_err();
    assert!(matches!(
        err.kind(),
        SceneCheckErrorKind::Config(config) if matches!(config.kind(), ConfigErrorKind::MissingFile(_))
    ));
}

#[test]
fn unknown_check_is_parse_error() {
    let file = config_file(
        r#"
[rules.vibes]
category = "structural"
severity = "info"
scope = "single_scene"
check = "good_vibes"
"#,
    );
    let err = SceneCheckConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(
        err.kind(),
        SceneCheckErrorKind::Config(config) if matches!(config.kind(), ConfigErrorKind::Schema(_))
    ));
}

#[test]
fn malformed_toml_is_source_error() {
    let file = config_file("[validation\nstrict_ordering = ");
    let err = SceneCheckConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(
        err.kind(),
        SceneCheckErrorKind::Config(config) if matches!(config.kind(), ConfigErrorKind::Sources(_))
    ));
}
