//! Report rendering.

use scenecheck_core::{Finding, Report, Severity};
use scenecheck_error::{JsonError, JsonErrorKind, SceneCheckResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::instrument;

/// Output document format.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportFormat {
    /// Pretty-printed JSON of the report structure
    Json,
    /// Standalone HTML page
    #[default]
    Html,
    /// Markdown document
    Markdown,
}

impl ReportFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }
}

/// Renders reports into documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRenderer;

impl ReportRenderer {
    /// Render `report` in `format`.
    #[instrument(skip(report), fields(findings = report.findings().len()))]
    pub fn render(report: &Report, format: ReportFormat) -> SceneCheckResult<String> {
        match format {
            ReportFormat::Json => Self::json(report),
            ReportFormat::Html => Ok(Self::html(report)),
            ReportFormat::Markdown => Ok(Self::markdown(report)),
        }
    }

    /// Pretty-printed JSON.
    pub fn json(report: &Report) -> SceneCheckResult<String> {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| JsonError::new(JsonErrorKind::Report(e.to_string())))?;
        Ok(text)
    }

    /// Standalone HTML page with a summary and one table per severity.
    pub fn html(report: &Report) -> String {
        let summary = report.summary();
        let mut out = String::new();
        out.push_str(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Scene Validation Report</title>\n<style>\n\
             body { font-family: Arial, sans-serif; margin: 20px; }\n\
             h1 { color: #333; }\n\
             .summary { background-color: #f5f5f5; padding: 15px; border-radius: 5px; }\n\
             .error { color: red; }\n\
             .warning { color: orange; }\n\
             .info { color: #555; }\n\
             table { border-collapse: collapse; width: 100%; margin-bottom: 20px; }\n\
             th, td { border: 1px solid #ddd; padding: 6px; text-align: left; vertical-align: top; }\n\
             </style>\n</head>\n<body>\n<h1>Scene Validation Report</h1>\n",
        );
        let _ = write!(
            out,
            "<div class=\"summary\">\n<h2>Summary</h2>\n\
             <p>Generated: {}</p>\n<p>Project version: <code>{}</code></p>\n\
             <p>Scenes checked: {}</p>\n<p>Entities checked: {}</p>\n\
             <p><span class=\"error\">Errors: {}</span> | \
             <span class=\"warning\">Warnings: {}</span> | \
             <span class=\"info\">Info: {}</span></p>\n</div>\n",
            report.generated_at().to_rfc3339(),
            escape(report.source_project_version()),
            summary.scenes_checked(),
            summary.entities_checked(),
            summary.errors(),
            summary.warnings(),
            summary.infos(),
        );

        if report.findings().is_empty() {
            out.push_str("<p>No issues found.</p>\n");
        }
        for (severity, findings) in report.by_severity() {
            let _ = write!(
                out,
                "<h2 class=\"{0}\">{1}</h2>\n<table>\n\
                 <tr><th>Rule</th><th>Scenes</th><th>Entity</th><th>Message</th><th>Suggested fix</th></tr>\n",
                severity,
                heading(severity)
            );
            for finding in findings {
                let _ = writeln!(
                    out,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape(finding.rule_id().as_str()),
                    escape(&scene_list(finding)),
                    escape(finding.entity_id().as_ref().map(|e| e.as_str()).unwrap_or("")),
                    escape(finding.message()),
                    escape(finding.suggested_fix().as_deref().unwrap_or("")),
                );
            }
            out.push_str("</table>\n");
        }
        out.push_str("</body>\n</html>\n");
        out
    }

    /// Markdown document with a summary and one section per severity.
    pub fn markdown(report: &Report) -> String {
        let summary = report.summary();
        let mut out = String::from("# Scene Validation Report\n\n");
        let _ = writeln!(out, "- Generated: {}", report.generated_at().to_rfc3339());
        let _ = writeln!(out, "- Project version: `{}`", report.source_project_version());
        let _ = writeln!(
            out,
            "- Scenes checked: {}, entities checked: {}",
            summary.scenes_checked(),
            summary.entities_checked()
        );
        let _ = writeln!(
            out,
            "- Errors: {}, warnings: {}, info: {}",
            summary.errors(),
            summary.warnings(),
            summary.infos()
        );

        if report.findings().is_empty() {
            out.push_str("\nNo issues found.\n");
        }
        for (severity, findings) in report.by_severity() {
            let _ = writeln!(out, "\n## {}\n", heading(severity));
            for finding in findings {
                let _ = write!(out, "- **{}**", finding.rule_id());
                let scenes = scene_list(finding);
                if !scenes.is_empty() {
                    let _ = write!(out, " [{}]", scenes);
                }
                if let Some(entity) = finding.entity_id() {
                    let _ = write!(out, " `{}`", entity);
                }
                let _ = writeln!(out, ": {}", finding.message());
                if let Some(fix) = finding.suggested_fix() {
                    let _ = writeln!(out, "  - Fix: {}", fix);
                }
            }
        }
        out
    }
}

fn heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Errors",
        Severity::Warning => "Warnings",
        Severity::Info => "Info",
    }
}

fn scene_list(finding: &Finding) -> String {
    finding
        .scene_ids()
        .iter()
        .map(|scene| scene.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"Rex\" & 'Ada'</b>"), "&lt;b&gt;&quot;Rex&quot; &amp; &#39;Ada&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_format_parses_lowercase() {
        assert_eq!("markdown".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!(ReportFormat::Json.to_string(), "json");
        assert_eq!(ReportFormat::Markdown.extension(), "md");
    }
}
