//! Merge, deduplicate and order findings into a report.

use chrono::{DateTime, Utc};
use scenecheck_core::{Finding, Report, ReportSummary, SceneId};
use scenecheck_project::ProjectSnapshot;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument};

/// Assembles a [`Report`] from rule and semantic findings.
///
/// Ordering: severity (errors first), then the earliest timeline position of
/// any implicated scene (findings without known scenes last), then rule id.
/// The sort is stable, so findings that tie keep the order they were added in.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    source_project_version: String,
    positions: HashMap<SceneId, usize>,
    scenes_checked: usize,
    entities_checked: usize,
    generated_at: Option<DateTime<Utc>>,
    findings: Vec<Finding>,
}

impl ReportBuilder {
    /// Start a report with no scene order information.
    pub fn new(source_project_version: impl Into<String>) -> Self {
        Self {
            source_project_version: source_project_version.into(),
            positions: HashMap::new(),
            scenes_checked: 0,
            entities_checked: 0,
            generated_at: None,
            findings: Vec::new(),
        }
    }

    /// Start a report for a snapshot, taking version and scene order from it.
    pub fn for_snapshot(snapshot: &ProjectSnapshot) -> Self {
        let entities: BTreeSet<_> = snapshot
            .registry()
            .iter()
            .map(|entity| entity.id())
            .chain(snapshot.tracker().entities())
            .collect();
        Self {
            positions: snapshot.store().positions(),
            scenes_checked: snapshot.store().len(),
            entities_checked: entities.len(),
            ..Self::new(snapshot.version().clone())
        }
    }

    /// Add rule engine findings.
    pub fn with_findings(mut self, findings: impl IntoIterator<Item = Finding>) -> Self {
        self.findings.extend(findings);
        self
    }

    /// Add semantic analyzer findings. They are passed through unchanged.
    pub fn with_semantic_findings(mut self, findings: impl IntoIterator<Item = Finding>) -> Self {
        let before = self.findings.len();
        self.findings.extend(findings);
        debug!(semantic = self.findings.len() - before, "Merged semantic findings");
        self
    }

    /// Pin the generation time instead of using the current time.
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    /// Finish the report. An empty finding set is a valid report.
    #[instrument(skip(self), fields(version = %self.source_project_version, findings = self.findings.len()))]
    pub fn build(self) -> Report {
        let mut seen = HashSet::new();
        let mut findings: Vec<Finding> = self
            .findings
            .into_iter()
            .filter(|finding| seen.insert(finding.clone()))
            .collect();

        let positions = &self.positions;
        let earliest = |finding: &Finding| {
            finding
                .scene_ids()
                .iter()
                .filter_map(|scene| positions.get(scene).copied())
                .min()
        };
        findings.sort_by(|a, b| {
            let key = |finding: &Finding| {
                let position = earliest(finding);
                (
                    *finding.severity(),
                    position.is_none(),
                    position,
                    finding.rule_id().clone(),
                )
            };
            key(a).cmp(&key(b))
        });

        let summary = ReportSummary::tally(&findings, self.scenes_checked, self.entities_checked);
        debug!(
            kept = findings.len(),
            errors = summary.errors(),
            warnings = summary.warnings(),
            "Built report"
        );
        Report::new(
            self.generated_at.unwrap_or_else(Utc::now),
            self.source_project_version,
            findings,
            summary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecheck_core::Severity;

    #[test]
    fn test_empty_report_is_valid() {
        let report = ReportBuilder::new("abc").build();
        assert!(report.findings().is_empty());
        assert!(report.is_clean());
        assert_eq!(report.source_project_version(), "abc");
    }

    #[test]
    fn test_exact_duplicates_are_dropped() {
        let finding = Finding::new("unknown-entity", Severity::Error, "ghost").with_scenes(["s1"]);
        let report = ReportBuilder::new("abc")
            .with_findings([finding.clone()])
            .with_semantic_findings([finding.clone(), finding.with_fix("register ghost")])
            .build();
        assert_eq!(report.findings().len(), 2);
    }
}
