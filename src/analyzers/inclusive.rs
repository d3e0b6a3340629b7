// SPDX-License-Identifier: PMPL-1.0-or-later
//! Inclusive language analyzer
//!
//! Dictionary scan for exclusionary or ableist terms. The same ordered table
//! feeds the rewrite engine's first substitution step.

use crate::analyzers::{Analyzer, Source, SourceKind};
use crate::findings::{Finding, Severity};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Rule id for inclusive language findings
pub const INCLUSIVE_RULE: &str = "inclusive-language";

/// Characters of context kept on either side of a match
const CONTEXT_CHARS: usize = 20;

/// One dictionary entry
#[derive(Debug)]
pub struct InclusiveTerm {
    /// Canonical term
    pub term: &'static str,
    /// Case-insensitive whole-word pattern
    pub pattern: Regex,
    /// Preferred replacement
    pub suggestion: &'static str,
}

fn term(term: &'static str, pattern: &str, suggestion: &'static str) -> InclusiveTerm {
    InclusiveTerm {
        term,
        pattern: Regex::new(&format!(r"(?i)\b(?:{})\b", pattern)).unwrap(),
        suggestion,
    }
}

/// Ordered inclusive language dictionary
pub static INCLUSIVE_TERMS: LazyLock<Vec<InclusiveTerm>> = LazyLock::new(|| {
    vec![
        term("blacklist", r"blacklist(?:s|ed|ing)?", "blocklist"),
        term("whitelist", r"whitelist(?:s|ed|ing)?", "allowlist"),
        term("master/slave", r"(?:master|slave)s?", "primary/replica"),
        term("crazy", r"crazy", "confusing"),
        term("guys", r"guys", "everyone"),
        term("handicapped", r"handicap(?:ped)?", "disabled"),
        term("grandfathered", r"grandfathered", "legacy"),
        term("dummy", r"dummy", "placeholder"),
        term("man-hours", r"man[-\s]?hours", "person-hours"),
    ]
});

/// A dictionary hit in some text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InclusiveIssue {
    /// Canonical dictionary term
    pub term: String,
    /// Text as matched
    pub matched: String,
    pub suggestion: String,
    /// Byte offset of the match
    pub index: usize,
    /// Surrounding text
    pub context: String,
}

impl InclusiveIssue {
    /// 1-indexed line of the match within `text`
    pub fn line_in(&self, text: &str) -> usize {
        text[..self.index.min(text.len())].matches('\n').count() + 1
    }
}

/// Find every dictionary match, ordered by position
pub fn find_inclusive_issues(text: &str) -> Vec<InclusiveIssue> {
    let mut issues: Vec<InclusiveIssue> = INCLUSIVE_TERMS
        .iter()
        .flat_map(|entry| {
            entry.pattern.find_iter(text).map(move |m| InclusiveIssue {
                term: entry.term.to_string(),
                matched: m.as_str().to_string(),
                suggestion: entry.suggestion.to_string(),
                index: m.start(),
                context: context_window(text, m.start(), m.end()),
            })
        })
        .collect();

    issues.sort_by_key(|issue| issue.index);
    issues
}

fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[from..to].trim().to_string()
}

/// Inclusive language analyzer for any source with prose
pub struct InclusiveLanguageAnalyzer;

impl Analyzer for InclusiveLanguageAnalyzer {
    fn name(&self) -> &str {
        "Inclusive Language Analyzer"
    }

    fn description(&self) -> &str {
        "Flags exclusionary terms and suggests inclusive replacements"
    }

    fn analyze(&self, source: &Source) -> Vec<Finding> {
        find_inclusive_issues(&source.text)
            .into_iter()
            .map(|issue| {
                let mut finding = Finding::new(
                    INCLUSIVE_RULE,
                    Severity::Warning,
                    &format!(
                        "\"{}\" is not inclusive language: \"{}\"",
                        issue.matched, issue.context
                    ),
                )
                .with_category("accessibility/inclusive-language")
                .with_rule_name("Inclusive Language")
                .with_location(&source.location)
                .with_element(&issue.term)
                .with_suggestion(&format!("Use \"{}\" instead", issue.suggestion));

                // Rendered HTML text has no meaningful line numbers
                if source.kind == SourceKind::Text {
                    finding = finding.with_line(issue.line_in(&source.text));
                }
                finding
            })
            .collect()
    }

    fn applies_to(&self, _kind: SourceKind) -> bool {
        true
    }
}
