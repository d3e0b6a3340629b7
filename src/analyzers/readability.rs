// SPDX-License-Identifier: PMPL-1.0-or-later
//! Readability analyzer - WCAG 3.1.5 Reading Level (Level AAA)
//!
//! Scores prose with Flesch Reading Ease and Flesch-Kincaid Grade Level.
//! Both formulas work on three counts: whitespace-delimited words, sentence
//! terminators, and a vowel-run syllable estimate.

use crate::analyzers::{Analyzer, Source, SourceKind};
use crate::color::round_to;
use crate::findings::{Finding, Severity, WcagLevel};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Rule id for reading level findings
pub const READING_LEVEL_RULE: &str = "WCAG-3.1.5-reading-level";

/// Texts shorter than this are not worth grading
const MIN_TEXT_CHARS: usize = 200;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+\s|\n").unwrap());
static VOWEL_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[aeiouy]+").unwrap());

/// Readability scores for one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadabilityResult {
    /// Flesch Reading Ease, higher is easier
    pub reading_ease: f64,
    /// Flesch-Kincaid Grade Level
    pub grade_level: f64,
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
}

impl ReadabilityResult {
    /// Plain-language label for the reading ease score
    pub fn band(&self) -> &'static str {
        match self.reading_ease {
            e if e >= 90.0 => "Very easy",
            e if e >= 80.0 => "Easy",
            e if e >= 70.0 => "Fairly easy",
            e if e >= 60.0 => "Standard",
            e if e >= 50.0 => "Fairly difficult",
            e if e >= 30.0 => "Difficult",
            _ => "Very confusing",
        }
    }
}

impl fmt::Display for ReadabilityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ease {:.1} ({}), grade {:.1}",
            self.reading_ease,
            self.band(),
            self.grade_level
        )
    }
}

/// Score a piece of text. Never fails and never yields NaN.
pub fn score(text: &str) -> ReadabilityResult {
    let sentences = SENTENCE_END.find_iter(text).count().max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = if words.is_empty() {
        1.0
    } else {
        syllables as f64 / words.len() as f64
    };

    let ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;

    ReadabilityResult {
        reading_ease: round_to(ease, 1),
        grade_level: round_to(grade, 1),
        words: words.len(),
        sentences,
        syllables,
    }
}

/// Estimate syllables in a single word
pub fn count_syllables(word: &str) -> usize {
    let letters: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect();

    if letters.is_empty() {
        return 0;
    }
    if letters.len() <= 3 {
        return 1;
    }

    let mut count = VOWEL_RUN.find_iter(&letters).count();
    if letters.ends_with('e') {
        count = count.saturating_sub(1);
    }
    if letters.ends_with(['a', 'e', 'i', 'o', 'u', 'y']) {
        count += 1;
    }
    count.max(1)
}

/// Reading level analyzer for any source with prose
pub struct ReadabilityAnalyzer {
    target_grade: f64,
}

impl ReadabilityAnalyzer {
    pub fn new(target_grade: f64) -> Self {
        Self { target_grade }
    }
}

impl Analyzer for ReadabilityAnalyzer {
    fn name(&self) -> &str {
        "Readability Analyzer"
    }

    fn description(&self) -> &str {
        "Estimates reading level with Flesch-Kincaid (WCAG 3.1.5)"
    }

    fn analyze(&self, source: &Source) -> Vec<Finding> {
        let text = source.text.trim();

        // Only analyze if there is substantial text content
        if text.chars().count() < MIN_TEXT_CHARS {
            return Vec::new();
        }

        let result = score(text);
        if result.grade_level <= self.target_grade {
            return Vec::new();
        }

        vec![Finding::new(
            READING_LEVEL_RULE,
            Severity::Info,
            &format!(
                "Text reading level is approximately grade {:.1} (reading ease {:.1}, {}). The target is grade {:.1}.",
                result.grade_level,
                result.reading_ease,
                result.band().to_lowercase(),
                self.target_grade
            ),
        )
        .with_wcag("3.1.5", WcagLevel::AAA)
        .with_rule_name("Reading Level")
        .with_location(&source.location)
        .with_suggestion(
            "Use shorter sentences, common words, and active voice, or run `clarabot rewrite`",
        )]
    }

    fn applies_to(&self, _kind: SourceKind) -> bool {
        true
    }
}
