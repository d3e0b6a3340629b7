// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for accessibility findings.
//!
//! Supports multiple output formats:
//! - Text: human-readable findings with WCAG criterion references
//! - JSON: structured findings for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//!
//! The single-purpose CLI commands render their raw results (contrast
//! findings, readability scores, inclusive issues) with the helpers at the
//! bottom of this module.

use crate::analyzers::contrast::ContrastFinding;
use crate::analyzers::inclusive::InclusiveIssue;
use crate::analyzers::readability::ReadabilityResult;
use crate::findings::{FindingSet, Severity};
use serde::Serialize;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Generate a report from findings
pub fn generate_report(findings: &FindingSet, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(findings),
        OutputFormat::Json => render_json(findings),
        OutputFormat::Sarif => generate_sarif_report(findings),
    }
}

/// Generate human-readable text report
fn generate_text_report(findings: &FindingSet) -> String {
    let mut output = String::new();

    output.push_str("=== Clarabot Accessibility Report ===\n\n");

    if findings.is_empty() {
        output.push_str("No accessibility issues found. All checks passed.\n");
        return output;
    }

    let errors = findings.errors().len();
    let warnings = findings.warnings().len();
    let total = findings.len();

    output.push_str(&format!(
        "Found {} issue(s): {} error(s), {} warning(s), {} info/suggestion(s)\n\n",
        total, errors, warnings, total - errors - warnings
    ));

    // Group by severity
    for severity in &[Severity::Error, Severity::Warning, Severity::Info, Severity::Suggestion] {
        let sev_findings = findings.by_severity(*severity);
        if sev_findings.is_empty() {
            continue;
        }

        output.push_str(&format!("--- {} ({}) ---\n", severity, sev_findings.len()));

        for finding in sev_findings {
            output.push_str(&format!("[{}] {}\n", finding.rule_id, finding.message));

            if finding.location.is_some() {
                output.push_str(&format!("  Location: {}\n", finding.location_string()));
            }

            if let Some(ref element) = finding.element {
                output.push_str(&format!("  Element: {}\n", element));
            }

            if let (Some(criterion), Some(level)) = (&finding.wcag_criterion, &finding.wcag_level) {
                output.push_str(&format!("  WCAG: {} (Level {})\n", criterion, level));
            }

            if let Some(ref suggestion) = finding.suggestion {
                output.push_str(&format!("  Fix: {}\n", suggestion));
            }

            output.push('\n');
        }
    }

    if findings.has_errors() {
        output.push_str("RESULT: FAIL (errors found)\n");
    } else if warnings > 0 {
        output.push_str("RESULT: PASS WITH WARNINGS\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}

/// Pretty JSON for any serializable result
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize results: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
}

/// Generate SARIF report
fn generate_sarif_report(findings: &FindingSet) -> String {
    let results: Vec<SarifResult> = findings
        .findings
        .iter()
        .map(|f| {
            let level = match f.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info | Severity::Suggestion => "note",
            };

            let locations = f
                .location
                .iter()
                .map(|uri| SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation { uri: uri.clone() },
                        region: f.line.map(|l| SarifRegion { start_line: l }),
                    },
                })
                .collect();

            SarifResult {
                rule_id: f.rule_id.clone(),
                level: level.to_string(),
                message: SarifMessage { text: f.message.clone() },
                locations,
            }
        })
        .collect();

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "clarabot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}

/// One line per scanned element, failures marked
pub fn render_contrast_table(results: &[ContrastFinding]) -> String {
    if results.is_empty() {
        return "No visible text found.\n".to_string();
    }

    let mut output = String::new();
    for r in results {
        let status = if r.passes { "PASS" } else { "FAIL" };
        output.push_str(&format!(
            "{} {:>6.2}:1 (needs {}:1{}) {} on {}  {}\n",
            status,
            r.ratio,
            r.required_ratio,
            if r.large_text { ", large" } else { "" },
            r.fg,
            r.bg,
            r.selector
        ));
        output.push_str(&format!("     \"{}\"\n", r.snippet));
        if let Some(ref suggested) = r.suggested_fg {
            output.push_str(&format!("     Try {}\n", suggested));
        }
    }

    let failing = results.iter().filter(|r| !r.passes).count();
    output.push_str(&format!(
        "\n{} element(s) checked, {} below WCAG AA\n",
        results.len(),
        failing
    ));
    output
}

/// Readability scores as text
pub fn render_readability(result: &ReadabilityResult) -> String {
    format!(
        "Reading ease: {:.1} ({})\nGrade level:  {:.1}\nWords: {}  Sentences: {}  Syllables: {}\n",
        result.reading_ease,
        result.band(),
        result.grade_level,
        result.words,
        result.sentences,
        result.syllables
    )
}

/// Inclusive language issues as text
pub fn render_inclusive(issues: &[InclusiveIssue], text: &str) -> String {
    if issues.is_empty() {
        return "No non-inclusive terms found.\n".to_string();
    }

    let mut output = String::new();
    for issue in issues {
        output.push_str(&format!(
            "line {}: \"{}\" -> \"{}\"\n    ...{}...\n",
            issue.line_in(text),
            issue.matched,
            issue.suggestion,
            issue.context
        ));
    }
    output
}
