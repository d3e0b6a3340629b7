// SPDX-License-Identifier: PMPL-1.0-or-later
//! Clarabot - contrast, readability and plain-language accessibility checks
//!
//! Clarabot finds text that is hard to see or hard to read, and helps fix it.
//!
//! ## Analyzers
//!
//! - **Contrast** (1.4.3): text contrast against the effective background,
//!   with the nearest passing foreground suggested for failures
//! - **Readability** (3.1.5): Flesch reading ease and Flesch-Kincaid grade
//! - **Inclusive language**: dictionary scan for exclusionary terms
//!
//! ## Rewriting
//!
//! The [`rewrite`] module simplifies prose toward a target grade, locally
//! with substitution tables and sentence chunking, or remotely through an
//! OpenAI-compatible chat completions API.

pub mod analyzers;
pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod findings;
pub mod report;
pub mod rewrite;
pub mod scanner;
pub mod tree;

pub use config::Config;
pub use error::{ClarabotError, Result};
