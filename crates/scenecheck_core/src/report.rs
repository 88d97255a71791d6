//! Validation report.

use crate::{Finding, Severity};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts shown at the top of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ReportSummary {
    errors: usize,
    warnings: usize,
    infos: usize,
    scenes_checked: usize,
    entities_checked: usize,
}

impl ReportSummary {
    /// Tally findings by severity.
    pub fn tally(findings: &[Finding], scenes_checked: usize, entities_checked: usize) -> Self {
        let count = |severity: Severity| {
            findings
                .iter()
                .filter(|finding| *finding.severity() == severity)
                .count()
        };
        Self {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
            scenes_checked,
            entities_checked,
        }
    }
}

/// Ordered, deduplicated findings of one validation run.
///
/// Two reports over the same project content differ only in `generated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Report {
    generated_at: DateTime<Utc>,
    source_project_version: String,
    findings: Vec<Finding>,
    summary: ReportSummary,
}

impl Report {
    /// Assemble a report from already-ordered findings.
    pub fn new(
        generated_at: DateTime<Utc>,
        source_project_version: impl Into<String>,
        findings: Vec<Finding>,
        summary: ReportSummary,
    ) -> Self {
        Self {
            generated_at,
            source_project_version: source_project_version.into(),
            findings,
            summary,
        }
    }

    /// True when no finding has error severity.
    pub fn is_clean(&self) -> bool {
        self.summary.errors == 0
    }

    /// Findings grouped by severity, most severe first, order preserved within a group.
    pub fn by_severity(&self) -> BTreeMap<Severity, Vec<&Finding>> {
        let mut groups: BTreeMap<Severity, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            groups.entry(*finding.severity()).or_default().push(finding);
        }
        groups
    }
}
