// SPDX-License-Identifier: PMPL-1.0-or-later
//! File, directory and page scanning.
//!
//! Walks directory trees, turns each supported file into a [`Source`] and
//! runs the configured analyzers over it.

use crate::analyzers::{self, Source};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::FetchedPage;
use crate::findings::FindingSet;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Markup extensions: contrast, readability and inclusive checks
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Prose extensions: readability and inclusive checks only
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Build a source for a file based on its extension
pub fn source_for_file(path: &Path, content: &str) -> Option<Source> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)?;
    let location = path.display().to_string();

    if HTML_EXTENSIONS.contains(&ext.as_str()) {
        Some(Source::html(&location, content))
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Some(Source::text(&location, content))
    } else {
        None
    }
}

/// Whether a file would be picked up by a scan
pub fn is_scannable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| {
            HTML_EXTENSIONS.contains(&ext.as_str()) || TEXT_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Scan a single file. Unsupported extensions yield no findings.
pub fn scan_file(path: &Path, config: &Config) -> Result<FindingSet> {
    if !is_scannable(path) {
        debug!("Skipping unsupported file {}", path.display());
        return Ok(FindingSet::new());
    }

    let content = std::fs::read_to_string(path)?;
    Ok(source_for_file(path, &content)
        .map(|source| analyzers::analyze_source(&source, config))
        .unwrap_or_default())
}

/// Scan a directory for accessibility issues
pub fn scan_directory(dir: &Path, config: &Config) -> Result<FindingSet> {
    let mut all_findings = FindingSet::new();
    let mut files_scanned = 0;

    info!("Scanning directory: {}", dir.display());

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden and excluded directories below the scan root
            let name = e.file_name().to_str().unwrap_or("");
            if e.depth() > 0 && e.file_type().is_dir() {
                return !config.exclude.iter().any(|x| x == name) && !name.starts_with('.');
            }
            true
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_file() || !is_scannable(entry.path()) {
            continue;
        }

        let path = entry.path();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                info!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if let Some(source) = source_for_file(path, &content) {
            all_findings.extend(analyzers::analyze_source(&source, config).findings);
            files_scanned += 1;
        }
    }

    info!("Scanned {} files, found {} issues", files_scanned, all_findings.len());

    Ok(all_findings)
}

/// Scan a file or a directory
pub fn scan_path(path: &Path, config: &Config) -> Result<FindingSet> {
    if path.is_dir() {
        scan_directory(path, config)
    } else {
        scan_file(path, config)
    }
}

/// Scan a fetched page
pub fn scan_page(page: &FetchedPage, config: &Config) -> FindingSet {
    let mut source = Source::html(&page.url, &page.html);
    if source.text.is_empty() {
        source.text = page.text.clone();
    }
    analyzers::analyze_source(&source, config)
}
