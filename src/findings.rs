// SPDX-License-Identifier: PMPL-1.0-or-later
//! Findings produced by the analyzers.
//!
//! Analysis results (contrast findings, readability scores, inclusive
//! language issues) are converted into `Finding`s so that every report
//! format renders them uniformly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails a WCAG requirement
    Error,
    /// Should be addressed
    Warning,
    /// Informational
    Info,
    /// Suggestion for improvement
    Suggestion,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
            Severity::Suggestion => write!(f, "SUGGESTION"),
        }
    }
}

/// WCAG conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level A - minimum conformance
    A,
    /// Level AA - standard conformance
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WcagLevel::A => write!(f, "A"),
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

/// A single accessibility finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique identifier
    pub id: Uuid,
    /// Source bot identifier
    pub source: String,
    /// Rule/check identifier (e.g., "WCAG-1.4.3-contrast")
    pub rule_id: String,
    /// Human-readable rule name
    pub rule_name: String,
    /// Severity level
    pub severity: Severity,
    /// Detailed message
    pub message: String,
    /// Category (e.g., "accessibility/wcag-aa")
    pub category: String,
    /// File path or URL the finding belongs to
    pub location: Option<String>,
    /// Line number (1-indexed), for plain-text sources
    pub line: Option<usize>,
    /// Element locator or matched text
    pub element: Option<String>,
    /// Suggested fix
    pub suggestion: Option<String>,
    /// When this finding was created
    pub created_at: DateTime<Utc>,
    /// WCAG criterion reference
    pub wcag_criterion: Option<String>,
    /// WCAG conformance level
    pub wcag_level: Option<WcagLevel>,
}

impl Finding {
    /// Create a new finding
    pub fn new(rule_id: &str, severity: Severity, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: "clarabot".to_string(),
            rule_id: rule_id.to_string(),
            rule_name: rule_id.to_string(),
            severity,
            message: message.to_string(),
            category: String::new(),
            location: None,
            line: None,
            element: None,
            suggestion: None,
            created_at: Utc::now(),
            wcag_criterion: None,
            wcag_level: None,
        }
    }

    /// Set the WCAG criterion and level
    pub fn with_wcag(mut self, criterion: &str, level: WcagLevel) -> Self {
        self.wcag_criterion = Some(criterion.to_string());
        self.wcag_level = Some(level);
        self.category = match level {
            WcagLevel::A => "accessibility/wcag-a".to_string(),
            WcagLevel::AA => "accessibility/wcag-aa".to_string(),
            WcagLevel::AAA => "accessibility/wcag-aaa".to_string(),
        };
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Set the rule name
    pub fn with_rule_name(mut self, name: &str) -> Self {
        self.rule_name = name.to_string();
        self
    }

    /// Set the file path or URL
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Set line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the element locator
    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    /// Set suggestion
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    /// Get location string for display
    pub fn location_string(&self) -> String {
        match (&self.location, self.line) {
            (Some(loc), Some(l)) => format!("{}:{}", loc, l),
            (Some(loc), None) => loc.clone(),
            _ => "<unknown>".to_string(),
        }
    }
}

/// A collection of findings with aggregation methods
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingSet {
    /// All findings
    pub findings: Vec<Finding>,
}

impl FindingSet {
    /// Create empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding
    pub fn add(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Extend with findings from an iterator
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// Get findings by severity
    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.severity == severity).collect()
    }

    /// Get findings with a given rule id
    pub fn by_rule(&self, rule_id: &str) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.rule_id == rule_id).collect()
    }

    /// Get all errors
    pub fn errors(&self) -> Vec<&Finding> {
        self.by_severity(Severity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> Vec<&Finding> {
        self.by_severity(Severity::Warning)
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    /// Total count
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Is empty
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_category_from_level() {
        let f = Finding::new("WCAG-1.4.3-contrast", Severity::Error, "low contrast")
            .with_wcag("1.4.3", WcagLevel::AA)
            .with_location("index.html");
        assert_eq!(f.category, "accessibility/wcag-aa");
        assert_eq!(f.source, "clarabot");
        assert_eq!(f.location_string(), "index.html");
    }

    #[test]
    fn test_location_with_line() {
        let f = Finding::new("inclusive-language", Severity::Warning, "x")
            .with_location("notes.txt")
            .with_line(4);
        assert_eq!(f.location_string(), "notes.txt:4");
        assert_eq!(Finding::new("r", Severity::Info, "m").location_string(), "<unknown>");
    }

    #[test]
    fn test_finding_set_aggregation() {
        let mut set = FindingSet::new();
        assert!(set.is_empty());
        set.add(Finding::new("a", Severity::Error, "e"));
        set.extend(vec![
            Finding::new("b", Severity::Warning, "w"),
            Finding::new("b", Severity::Info, "i"),
        ]);
        assert_eq!(set.len(), 3);
        assert!(set.has_errors());
        assert_eq!(set.errors().len(), 1);
        assert_eq!(set.warnings().len(), 1);
        assert_eq!(set.by_rule("b").len(), 2);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        assert_eq!(Severity::Error.to_string(), "ERROR");
    }
}
