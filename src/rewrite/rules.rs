// SPDX-License-Identifier: PMPL-1.0-or-later
//! Substitution tables for plain-language rewriting.
//!
//! Tables are applied in a fixed order: inclusive terms, jargon, filler
//! adverbs, then passive softening. All matching is whole-word and
//! case-insensitive, and a match that starts with a capital letter gets a
//! capitalized replacement.

use crate::analyzers::inclusive::INCLUSIVE_TERMS;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// A whole-word pattern and its plain replacement
#[derive(Debug)]
pub struct Substitution {
    pub pattern: Regex,
    pub replacement: &'static str,
}

fn word(pattern: &str, replacement: &'static str) -> Substitution {
    Substitution {
        pattern: Regex::new(&format!(r"(?i)\b(?:{})\b", pattern)).unwrap(),
        replacement,
    }
}

/// Jargon and wordy phrases, in application order
pub static JARGON: LazyLock<Vec<Substitution>> = LazyLock::new(|| {
    vec![
        word("utilize", "use"),
        word("utilization", "use"),
        word("leverage", "use"),
        word("approximately", "about"),
        word("commence", "start"),
        word("commencement", "start"),
        word("terminate", "end"),
        word(r"prior\s+to", "before"),
        word(r"subsequent\s+to", "after"),
        word(r"in\s+order\s+to", "to"),
        word("endeavor", "try"),
        word("facilitate", "help"),
        word("assist", "help"),
        word("demonstrate", "show"),
        word("sufficient", "enough"),
        word("numerous", "many"),
        word("additional", "more"),
        word("purchase", "buy"),
    ]
});

/// A run of filler adverbs and the first letter of the word they modify
static FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:basically|actually|literally|really|very|quite)\b,?\s+)+(\w)").unwrap()
});

/// `is|was|were <word>ed`
static PASSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:is|was|were)\s+([a-z]{2,}ed)\b").unwrap());

/// Apply every table once, in order
pub fn apply_substitutions(text: &str) -> String {
    let mut out = apply_inclusive(text);
    out = apply_jargon(&out);
    out = strip_fillers(&out);
    soften_passive(&out)
}

/// Replace non-inclusive terms with their suggestions
pub fn apply_inclusive(text: &str) -> String {
    INCLUSIVE_TERMS.iter().fold(text.to_string(), |acc, entry| {
        replace_matching_case(&acc, &entry.pattern, entry.suggestion)
    })
}

/// Replace jargon with plain words
pub fn apply_jargon(text: &str) -> String {
    JARGON.iter().fold(text.to_string(), |acc, sub| {
        replace_matching_case(&acc, &sub.pattern, sub.replacement)
    })
}

/// Drop filler adverbs, keeping the capital of a sentence-initial one
pub fn strip_fillers(text: &str) -> String {
    FILLER
        .replace_all(text, |caps: &Captures| {
            let next = &caps[1];
            let start = caps.get(0).map_or(0, |m| m.start());
            if starts_uppercase(&caps[0]) && at_sentence_start(text, start) {
                capitalize(next)
            } else {
                next.to_string()
            }
        })
        .into_owned()
}

/// Turn `was tested` into `tested`
pub fn soften_passive(text: &str) -> String {
    PASSIVE
        .replace_all(text, |caps: &Captures| {
            let verb = &caps[1];
            if starts_uppercase(&caps[0]) {
                capitalize(verb)
            } else {
                verb.to_string()
            }
        })
        .into_owned()
}

fn replace_matching_case(text: &str, pattern: &Regex, replacement: &str) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            if starts_uppercase(&caps[0]) {
                capitalize(replacement)
            } else {
                replacement.to_string()
            }
        })
        .into_owned()
}

/// Whether `index` begins the text or follows a sentence terminator or newline
fn at_sentence_start(text: &str, index: usize) -> bool {
    let before = &text[..index];
    let trimmed = before.trim_end();
    trimmed.is_empty()
        || trimmed.ends_with(['.', '!', '?'])
        || before[trimmed.len()..].contains('\n')
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}

/// Uppercase the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
