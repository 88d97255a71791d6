//! Rule listing command handler.

use scenecheck::{Rule, RulePredicate, SceneCheckConfig, SceneCheckResult};
use std::path::Path;

/// Print the effective rule set in evaluation order.
pub fn list_rules(rules: Option<&Path>) -> SceneCheckResult<()> {
    let config = SceneCheckConfig::load_with(rules)?;
    let rule_set = config.rule_set()?;

    println!(
        "{:<28} {:<12} {:<8} {:>8} {:<8} {}",
        "ID", "CATEGORY", "SEVERITY", "PRIORITY", "ENABLED", "CHECK"
    );
    for rule in rule_set.rules() {
        println!("{}", row(rule));
    }
    println!("\n{} rule(s)", rule_set.len());
    Ok(())
}

fn row(rule: &Rule) -> String {
    let definition = rule.definition();
    format!(
        "{:<28} {:<12} {:<8} {:>8} {:<8} {}",
        rule.id().to_string(),
        definition.category().to_string(),
        definition.severity().to_string(),
        definition.priority(),
        if *definition.enabled() { "yes" } else { "no" },
        check_name(definition.predicate())
    )
}

fn check_name(predicate: &RulePredicate) -> String {
    serde_json::to_value(predicate)
        .ok()
        .and_then(|value| value.get("check").and_then(|c| c.as_str()).map(String::from))
        .unwrap_or_default()
}
