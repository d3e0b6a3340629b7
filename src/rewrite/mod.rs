// SPDX-License-Identifier: PMPL-1.0-or-later
//! Readability-driven rewriting.
//!
//! The local engine alternates substitution and sentence chunking until the
//! Flesch-Kincaid grade is within reach of the target, tightening the
//! sentence length ceiling on every pass. A remote rewriter backed by a chat
//! completions API is available behind the same [`Rewriter`] trait.

pub mod remote;
pub mod rules;

use crate::analyzers::readability;
use crate::document::collapse_whitespace;
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

pub use remote::RemoteRewriter;
pub use rules::apply_substitutions;

/// Default number of passes
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Shortest sentence ceiling the engine will use
pub const MIN_CEILING: usize = 8;

/// Grade slack accepted when checking against the target
const GRADE_TOLERANCE: f64 = 0.2;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+\s+|\n+").unwrap());

/// Engine tuning
#[derive(Debug, Clone, Copy)]
pub struct RewriteOptions {
    /// Maximum passes, at least one always runs
    pub max_iterations: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Deterministic local rewrite engine
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteEngine {
    options: RewriteOptions,
}

impl RewriteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RewriteOptions) -> Self {
        Self { options }
    }

    /// Rewrite `text` toward `target_grade`
    pub fn rewrite(&self, text: &str, target_grade: f64) -> String {
        let mut current = normalize(text);
        let mut ceiling = initial_ceiling(target_grade);
        let passes = self.options.max_iterations.max(1);

        for pass in 1..=passes {
            current = rewrite_pass(&current, ceiling);
            let grade = readability::score(&current).grade_level;
            debug!(
                "Rewrite pass {}/{}: ceiling {} words, grade {:.1} (target {:.1})",
                pass, passes, ceiling, grade, target_grade
            );

            if grade <= target_grade + GRADE_TOLERANCE {
                break;
            }
            ceiling = ceiling.saturating_sub(2).max(MIN_CEILING);
        }

        current
    }
}

/// Rewrite with the default engine
pub fn rewrite(text: &str, target_grade: f64) -> String {
    RewriteEngine::default().rewrite(text, target_grade)
}

/// Starting words-per-sentence ceiling for a target grade
pub fn initial_ceiling(target_grade: f64) -> usize {
    let doubled = (target_grade * 2.0).round();
    if doubled.is_nan() {
        return 10;
    }
    doubled.clamp(10.0, 24.0) as usize
}

fn normalize(text: &str) -> String {
    text.trim_end().replace("\r\n", "\n")
}

/// One substitution and chunking pass
pub fn rewrite_pass(text: &str, ceiling: usize) -> String {
    let substituted = apply_substitutions(text);
    let sentences: Vec<String> = split_sentences(&substituted)
        .into_iter()
        .map(|s| simplify_sentence(s, ceiling))
        .collect();
    collapse_whitespace(&sentences.join(" "))
}

/// Split at terminator runs followed by whitespace, and at newlines.
/// Terminators stay with their sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        sentences.push(&text[start..end]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Cut a sentence longer than `ceiling` words into sentence-sized chunks
pub fn simplify_sentence(sentence: &str, ceiling: usize) -> String {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    let ceiling = ceiling.max(1);
    if words.len() <= ceiling {
        return words.join(" ");
    }

    let chunks: Vec<&[&str]> = words.chunks(ceiling).collect();
    let last = chunks.len() - 1;

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut piece = chunk.join(" ");
            if i < last {
                piece = piece.trim_end_matches([',', ';', ':']).to_string();
                if !piece.ends_with(['.', '!', '?']) {
                    piece.push('.');
                }
            }
            if i > 0 {
                piece = rules::capitalize(&piece);
            }
            piece
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Something that can rewrite text toward a reading grade
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn rewrite(&self, text: &str, target_grade: f64) -> Result<String>;
}

/// In-process rewriter; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRewriter {
    engine: RewriteEngine,
}

impl LocalRewriter {
    pub fn new(engine: RewriteEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Rewriter for LocalRewriter {
    fn name(&self) -> &str {
        "local"
    }

    async fn rewrite(&self, text: &str, target_grade: f64) -> Result<String> {
        Ok(self.engine.rewrite(text, target_grade))
    }
}
