// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility analyzers.
//!
//! - **Contrast** (1.4.3): effective-background contrast per visible text node
//! - **Remediation**: nearest AA-compliant foreground for failing nodes
//! - **Readability** (3.1.5): Flesch reading ease and Flesch-Kincaid grade
//! - **Inclusive language**: dictionary scan for exclusionary terms

pub mod contrast;
pub mod inclusive;
pub mod readability;
pub mod remediation;

use crate::config::Config;
use crate::document::StaticDocument;
use crate::findings::{Finding, FindingSet};

/// What kind of content a source holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Markup with a renderable tree
    Html,
    /// Plain prose (text, markdown)
    Text,
}

/// One unit of content to analyze: a file or a fetched page
#[derive(Debug, Clone)]
pub struct Source {
    /// File path or URL, used to locate findings
    pub location: String,
    pub kind: SourceKind,
    /// Parsed tree, present for HTML sources
    pub document: Option<StaticDocument>,
    /// Readable text (rendered text for HTML)
    pub text: String,
}

impl Source {
    /// Build a source from HTML markup
    pub fn html(location: &str, html: &str) -> Self {
        let document = StaticDocument::parse(html);
        let text = document.text();
        Self {
            location: location.to_string(),
            kind: SourceKind::Html,
            document: Some(document),
            text,
        }
    }

    /// Build a source from plain text
    pub fn text(location: &str, text: &str) -> Self {
        Self {
            location: location.to_string(),
            kind: SourceKind::Text,
            document: None,
            text: text.to_string(),
        }
    }
}

/// Trait implemented by all analyzers
pub trait Analyzer: Send + Sync {
    /// Human-readable name of this analyzer
    fn name(&self) -> &str;

    /// Short description of what this analyzer checks
    fn description(&self) -> &str;

    /// Analyze a source and return findings
    fn analyze(&self, source: &Source) -> Vec<Finding>;

    /// Whether this analyzer understands the given kind of source
    fn applies_to(&self, kind: SourceKind) -> bool;
}

/// The analyzers configured for a run
pub fn analyzers(config: &Config) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(contrast::ContrastAnalyzer::new(config.contrast.limit)),
        Box::new(readability::ReadabilityAnalyzer::new(config.readability.target_grade)),
        Box::new(inclusive::InclusiveLanguageAnalyzer),
    ]
}

/// Run all applicable analyzers on a source
pub fn analyze_source(source: &Source, config: &Config) -> FindingSet {
    let mut findings = FindingSet::new();

    for analyzer in analyzers(config) {
        if analyzer.applies_to(source.kind) {
            findings.extend(analyzer.analyze(source));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_source_skips_contrast() {
        let config = Config::default();
        let source = Source::text("notes.txt", "Add it to the whitelist.");
        let findings = analyze_source(&source, &config);
        assert!(findings.by_rule(contrast::CONTRAST_RULE).is_empty());
        assert_eq!(findings.by_rule(inclusive::INCLUSIVE_RULE).len(), 1);
    }

    #[test]
    fn test_html_source_runs_all() {
        let config = Config::default();
        let source = Source::html(
            "page.html",
            r#"<html><body><p style="color:#ccc">Ask the guys.</p></body></html>"#,
        );
        assert_eq!(source.text, "Ask the guys.");
        let findings = analyze_source(&source, &config);
        assert!(!findings.by_rule(contrast::CONTRAST_RULE).is_empty());
        assert_eq!(findings.by_rule(inclusive::INCLUSIVE_RULE).len(), 1);
    }
}
