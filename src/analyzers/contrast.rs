// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color contrast analyzer - WCAG 1.4.3 Contrast (Minimum) (Level AA)
//!
//! Walks a rendered content tree and checks every visible text-bearing
//! element against the contrast of its effective background: the single
//! opaque color left after compositing every translucent background layer
//! from the element outward, on a white canvas.
//! - 4.5:1 for normal text
//! - 3:1 for large text (bold >= 14pt, or any weight >= 18pt)

use crate::analyzers::remediation::suggest_foreground;
use crate::analyzers::{Analyzer, Source, SourceKind};
use crate::color::{composite, contrast_ratio, parse_color, Color};
use crate::document::collapse_whitespace;
use crate::findings::{Finding, Severity, WcagLevel};
use crate::tree::{ContentTree, StyleResolver};
use serde::Serialize;
use tracing::debug;

/// Rule id for contrast findings
pub const CONTRAST_RULE: &str = "WCAG-1.4.3-contrast";

/// Default cap on findings per scan
pub const DEFAULT_LIMIT: usize = 30;

/// Required ratio for normal text
pub const AA_NORMAL_RATIO: f64 = 4.5;

/// Required ratio for large text
pub const AA_LARGE_RATIO: f64 = 3.0;

const PX_PER_PT: f64 = 96.0 / 72.0;
const DEFAULT_FONT_PX: f64 = 16.0;
const DEFAULT_FONT_WEIGHT: u32 = 400;
const BOLD_WEIGHT: u32 = 700;
const SNIPPET_CHARS: usize = 60;
const LOCATOR_DEPTH: usize = 5;

/// Contrast result for one visible text-bearing element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastFinding {
    /// Best-effort CSS path to the element
    pub selector: String,
    /// Leading text of the element
    pub snippet: String,
    /// Resolved foreground, `#rrggbb`
    pub fg: String,
    /// Resolved effective background, `#rrggbb`
    pub bg: String,
    /// Contrast ratio, 2 decimals
    pub ratio: f64,
    pub passes: bool,
    pub large_text: bool,
    /// Ratio this element needed
    pub required_ratio: f64,
    /// Font size in px, rounded
    pub font_size: f64,
    /// Nearest foreground meeting `required_ratio`, only for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fg: Option<String>,
}

/// Scan tuning
#[derive(Debug, Clone, Copy)]
pub struct ContrastOptions {
    /// Stop after this many findings
    pub limit: usize,
}

impl Default for ContrastOptions {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT }
    }
}

/// Whether text of this size and weight is "large" under WCAG
pub fn is_large_text(font_px: f64, font_weight: u32) -> bool {
    if font_weight >= BOLD_WEIGHT {
        font_px >= 14.0 * PX_PER_PT
    } else {
        font_px >= 18.0 * PX_PER_PT
    }
}

/// Minimum AA ratio for the given size class
pub fn required_ratio(large_text: bool) -> f64 {
    if large_text {
        AA_LARGE_RATIO
    } else {
        AA_NORMAL_RATIO
    }
}

/// Resolve the opaque color behind `node`.
///
/// Layers are collected from the node outward; each ancestor's background
/// goes underneath what has been accumulated so far. Unparseable or missing
/// backgrounds count as transparent. If the chain never becomes opaque the
/// result is flattened onto a white canvas.
pub fn effective_background<T, S>(tree: &T, styles: &S, node: T::Node) -> Color
where
    T: ContentTree,
    S: StyleResolver<T::Node>,
{
    let mut acc = Color::TRANSPARENT;
    let mut current = Some(node);

    while let Some(n) = current {
        let layer = styles
            .background_color(n)
            .and_then(|v| parse_color(&v))
            .unwrap_or(Color::TRANSPARENT);
        acc = composite(acc, layer);
        if acc.is_opaque() {
            return acc;
        }
        current = tree.parent(n);
    }

    composite(acc, Color::WHITE)
}

/// Foreground color of `node`, opaque black when unknown
pub fn resolve_foreground<T, S>(styles: &S, node: T::Node) -> Color
where
    T: ContentTree,
    S: StyleResolver<T::Node>,
{
    styles
        .color(node)
        .and_then(|v| parse_color(&v))
        .unwrap_or(Color::BLACK)
}

/// Build a CSS-like path of at most five segments, ending early at an id
pub fn locator<T: ContentTree>(tree: &T, node: T::Node) -> String {
    let mut parts = Vec::new();
    let mut current = Some(node);

    while let Some(n) = current {
        if parts.len() >= LOCATOR_DEPTH {
            break;
        }
        let tag = tree.tag_name(n);

        if let Some(id) = tree.attribute(n, "id").filter(|id| !id.is_empty()) {
            parts.push(format!("{}#{}", tag, id));
            break;
        }

        let mut nth = 1;
        let mut sibling = tree.previous_sibling(n);
        while let Some(s) = sibling {
            if tree.tag_name(s) == tag {
                nth += 1;
            }
            sibling = tree.previous_sibling(s);
        }
        parts.push(format!("{}:nth-of-type({})", tag, nth));

        current = tree.parent(n);
    }

    parts.reverse();
    parts.join(" > ")
}

/// Hidden from assistive technology, which also hides every descendant
fn hidden_subtree<T: ContentTree>(tree: &T, node: T::Node) -> bool {
    tree.attribute(node, "aria-hidden") == Some("true") || tree.attribute(node, "hidden").is_some()
}

fn presentational<T: ContentTree>(tree: &T, node: T::Node) -> bool {
    matches!(tree.attribute(node, "role"), Some("presentation") | Some("none"))
}

/// Check every visible text-bearing element below the tree root.
///
/// Never fails: unknown colors fall back to black text and a transparent
/// layer, and a tree without visible text yields an empty list.
pub fn scan_contrast<T, S>(tree: &T, styles: &S, options: &ContrastOptions) -> Vec<ContrastFinding>
where
    T: ContentTree,
    S: StyleResolver<T::Node>,
{
    let mut results = Vec::new();
    let mut visited = 0usize;

    let mut stack: Vec<T::Node> = tree.children(tree.root());
    stack.reverse();

    while let Some(node) = stack.pop() {
        if results.len() >= options.limit {
            break;
        }
        visited += 1;

        if hidden_subtree(tree, node) {
            continue;
        }

        let mut children = tree.children(node);
        children.reverse();
        stack.extend(children);

        if presentational(tree, node) || !styles.is_visible(node) {
            continue;
        }

        let text = collapse_whitespace(&tree.text_content(node));
        if text.is_empty() {
            continue;
        }

        results.push(check_node(tree, styles, node, &text));
    }

    debug!(
        "Contrast scan visited {} elements, recorded {} findings ({} failing)",
        visited,
        results.len(),
        results.iter().filter(|r| !r.passes).count()
    );

    results
}

fn check_node<T, S>(tree: &T, styles: &S, node: T::Node, text: &str) -> ContrastFinding
where
    T: ContentTree,
    S: StyleResolver<T::Node>,
{
    let fg = resolve_foreground::<T, S>(styles, node);
    let bg = effective_background(tree, styles, node);
    let ratio = contrast_ratio(fg, bg);

    let font_px = styles
        .font_size(node)
        .filter(|px| px.is_finite() && *px > 0.0)
        .unwrap_or(DEFAULT_FONT_PX);
    let weight = styles.font_weight(node).unwrap_or(DEFAULT_FONT_WEIGHT);
    let large_text = is_large_text(font_px, weight);
    let required = required_ratio(large_text);
    let passes = ratio >= required;

    let suggested_fg = (!passes).then(|| suggest_foreground(fg, bg, required).to_hex());

    ContrastFinding {
        selector: locator(tree, node),
        snippet: text.chars().take(SNIPPET_CHARS).collect(),
        fg: fg.to_hex(),
        bg: bg.to_hex(),
        ratio,
        passes,
        large_text,
        required_ratio: required,
        font_size: font_px.round(),
        suggested_fg,
    }
}

/// Contrast analyzer for HTML sources
pub struct ContrastAnalyzer {
    options: ContrastOptions,
}

impl ContrastAnalyzer {
    pub fn new(limit: usize) -> Self {
        Self {
            options: ContrastOptions { limit },
        }
    }
}

impl Default for ContrastAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl Analyzer for ContrastAnalyzer {
    fn name(&self) -> &str {
        "Color Contrast Analyzer"
    }

    fn description(&self) -> &str {
        "Checks text contrast against the effective background (WCAG 1.4.3)"
    }

    fn analyze(&self, source: &Source) -> Vec<Finding> {
        let Some(document) = source.document.as_ref() else {
            return Vec::new();
        };

        scan_contrast(document, document, &self.options)
            .into_iter()
            .filter(|r| !r.passes)
            .map(|r| to_finding(&r, &source.location))
            .collect()
    }

    fn applies_to(&self, kind: SourceKind) -> bool {
        kind == SourceKind::Html
    }
}

/// Convert a failing contrast result into a report finding
pub fn to_finding(result: &ContrastFinding, location: &str) -> Finding {
    let size_class = if result.large_text { "large" } else { "normal" };
    let mut finding = Finding::new(
        CONTRAST_RULE,
        Severity::Error,
        &format!(
            "Contrast ratio {:.2}:1 ({} on {}) is below the WCAG AA minimum of {}:1 for {} text: \"{}\"",
            result.ratio, result.fg, result.bg, result.required_ratio, size_class, result.snippet
        ),
    )
    .with_wcag("1.4.3", WcagLevel::AA)
    .with_rule_name("Contrast (Minimum)")
    .with_location(location)
    .with_element(&result.selector);

    if let Some(ref suggested) = result.suggested_fg {
        finding = finding.with_suggestion(&format!(
            "Use {} for the text color (>= {}:1 against {})",
            suggested, result.required_ratio, result.bg
        ));
    }

    finding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StaticDocument;

    /// Hand-built tree: node 0 is the root
    struct FakeTree {
        tags: Vec<&'static str>,
        parents: Vec<Option<usize>>,
        texts: Vec<&'static str>,
        colors: Vec<Option<&'static str>>,
        backgrounds: Vec<Option<&'static str>>,
        visible: Vec<bool>,
    }

    impl ContentTree for FakeTree {
        type Node = usize;

        fn root(&self) -> usize {
            0
        }

        fn children(&self, node: usize) -> Vec<usize> {
            (0..self.tags.len()).filter(|&i| self.parents[i] == Some(node)).collect()
        }

        fn parent(&self, node: usize) -> Option<usize> {
            self.parents[node]
        }

        fn previous_sibling(&self, node: usize) -> Option<usize> {
            let parent = self.parents[node]?;
            self.children(parent).into_iter().take_while(|&c| c != node).last()
        }

        fn tag_name(&self, node: usize) -> &str {
            self.tags[node]
        }

        fn attribute(&self, _node: usize, _name: &str) -> Option<&str> {
            None
        }

        fn text_content(&self, node: usize) -> String {
            self.texts[node].to_string()
        }
    }

    impl StyleResolver<usize> for FakeTree {
        fn color(&self, node: usize) -> Option<String> {
            self.colors[node].map(str::to_string)
        }

        fn background_color(&self, node: usize) -> Option<String> {
            self.backgrounds[node].map(str::to_string)
        }

        fn font_size(&self, _node: usize) -> Option<f64> {
            None
        }

        fn font_weight(&self, _node: usize) -> Option<u32> {
            None
        }

        fn is_visible(&self, node: usize) -> bool {
            self.visible[node]
        }
    }

    fn translucent_chain() -> FakeTree {
        FakeTree {
            tags: vec!["body", "div", "p"],
            parents: vec![None, Some(0), Some(1)],
            texts: vec!["Hello", "Hello", "Hello"],
            colors: vec![None, None, Some("rgb(0,0,0)")],
            backgrounds: vec![
                Some("#ffffff"),
                Some("rgba(255,255,255,0.5)"),
                None,
            ],
            visible: vec![true, true, true],
        }
    }

    fn doc(body: &str) -> StaticDocument {
        StaticDocument::parse(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_large_text_thresholds() {
        assert!(!is_large_text(18.0, 700));
        assert!(is_large_text(18.67, 700));
        assert!(!is_large_text(23.9, 400));
        assert!(is_large_text(24.0, 400));
        assert!(!is_large_text(24.0 - 1e-9, 600));
    }

    #[test]
    fn test_effective_background_through_translucent_ancestor() {
        let tree = translucent_chain();
        let bg = effective_background(&tree, &tree, 2);
        assert_eq!(bg.to_hex(), "#ffffff");
        assert!(bg.is_opaque());

        let findings = scan_contrast(&tree, &tree, &ContrastOptions::default());
        let p = findings.iter().find(|f| f.selector.ends_with("p:nth-of-type(1)")).unwrap();
        assert_eq!(p.ratio, contrast_ratio(Color::BLACK, bg));
        assert_eq!(p.ratio, 21.0);
        assert!(p.passes);
    }

    #[test]
    fn test_effective_background_layers_under_accumulated() {
        // Half-black text container over an opaque white ancestor
        let mut tree = translucent_chain();
        tree.backgrounds = vec![Some("#ffffff"), None, Some("rgba(0,0,0,0.5)")];
        let bg = effective_background(&tree, &tree, 2);
        assert_eq!(bg.to_hex(), "#808080");
    }

    #[test]
    fn test_effective_background_defaults_to_white_canvas() {
        let mut tree = translucent_chain();
        tree.backgrounds = vec![None, Some("not-a-color"), Some("rgba(0,0,255,0.0)")];
        assert_eq!(effective_background(&tree, &tree, 2), Color::WHITE);
    }

    #[test]
    fn test_effective_background_stops_at_first_opaque_layer() {
        let mut tree = translucent_chain();
        tree.backgrounds = vec![Some("#ffffff"), Some("#000000"), None];
        assert_eq!(effective_background(&tree, &tree, 2), Color::BLACK);
    }

    #[test]
    fn test_failing_node_gets_suggestion() {
        let d = doc(r#"<p id="muted" style="color: #aaaaaa">Low contrast text</p>"#);
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let muted = findings.iter().find(|f| f.selector == "p#muted").unwrap();
        assert!(!muted.passes);
        assert_eq!(muted.required_ratio, AA_NORMAL_RATIO);
        let suggested = parse_color(muted.suggested_fg.as_ref().unwrap()).unwrap();
        assert!(contrast_ratio(suggested, Color::WHITE) >= AA_NORMAL_RATIO);
    }

    #[test]
    fn test_large_text_uses_relaxed_threshold() {
        // #949494 on white is about 3.03:1
        let d = doc(r#"<h1 id="t" style="color: #949494">Big heading</h1><p id="s" style="color: #949494">Small</p>"#);
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let heading = findings.iter().find(|f| f.selector == "h1#t").unwrap();
        let small = findings.iter().find(|f| f.selector == "p#s").unwrap();
        assert!(heading.large_text && heading.passes);
        assert_eq!(heading.font_size, 32.0);
        assert!(!small.large_text && !small.passes);
    }

    #[test]
    fn test_equal_colors_fail_both_thresholds() {
        let d = doc(r#"<p id="same" style="color:#777; background:#777; font-size:40px">Same</p>"#);
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let same = findings.iter().find(|f| f.selector == "p#same").unwrap();
        assert_eq!(same.ratio, 1.0);
        assert!(same.large_text);
        assert!(!same.passes);
    }

    #[test]
    fn test_skips_hidden_decorative_and_empty() {
        let d = doc(
            r#"<p aria-hidden="true"><span>hidden from AT</span></p>
               <p role="presentation">decorative</p>
               <p hidden>hidden</p>
               <p style="display:none">not rendered</p>
               <div id="empty">   </div>
               <p id="ok">Visible</p>"#,
        );
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let selectors: Vec<&str> = findings.iter().map(|f| f.selector.as_str()).collect();
        assert_eq!(selectors, vec!["p#ok"]);
    }

    #[test]
    fn test_named_colors_white_on_black_passes() {
        let d = doc(
            r#"<div style="background-color:#000000"><p id="w" style="color: white">White text</p></div>
               <p id="n" style="color: navy; background: Yellow">Navy on yellow</p>"#,
        );
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let white = findings.iter().find(|f| f.selector == "p#w").unwrap();
        assert_eq!(white.fg, "#ffffff");
        assert_eq!(white.bg, "#000000");
        assert_eq!(white.ratio, 21.0);
        assert!(white.passes);
        assert!(white.suggested_fg.is_none());

        let navy = findings.iter().find(|f| f.selector == "p#n").unwrap();
        assert_eq!(navy.fg, "#000080");
        assert_eq!(navy.bg, "#ffff00");
        assert!(navy.passes);
    }

    #[test]
    fn test_unparseable_foreground_defaults_to_black() {
        let d = doc(r#"<p id="named" style="color: rebeccapurple">Text</p>"#);
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let named = findings.iter().find(|f| f.selector == "p#named").unwrap();
        assert_eq!(named.fg, "#000000");
        assert_eq!(named.bg, "#ffffff");
    }

    #[test]
    fn test_limit_bounds_results() {
        let body: String = (0..50).map(|i| format!("<p>Item {}</p>", i)).collect();
        let d = doc(&body);
        assert_eq!(scan_contrast(&d, &d, &ContrastOptions::default()).len(), DEFAULT_LIMIT);
        assert_eq!(scan_contrast(&d, &d, &ContrastOptions { limit: 3 }).len(), 3);
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let d = StaticDocument::parse("");
        assert!(scan_contrast(&d, &d, &ContrastOptions::default()).is_empty());
    }

    #[test]
    fn test_locator_nth_of_type_and_depth() {
        let d = doc("<div><p>a</p><span>b</span><p>c</p></div>");
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let c = findings.iter().find(|f| f.snippet == "c").unwrap();
        assert_eq!(c.selector, "html:nth-of-type(1) > body:nth-of-type(1) > div:nth-of-type(1) > p:nth-of-type(2)");

        let deep = doc("<div><div><div><div><div><div><em>deep</em></div></div></div></div></div></div>");
        let findings = scan_contrast(&deep, &deep, &ContrastOptions::default());
        let em = findings.iter().find(|f| f.selector.ends_with("em:nth-of-type(1)")).unwrap();
        assert_eq!(em.selector.split(" > ").count(), 5);
    }

    #[test]
    fn test_snippet_truncated_to_sixty_chars() {
        let long = "word ".repeat(40);
        let d = doc(&format!("<p id=\"long\">{}</p>", long));
        let findings = scan_contrast(&d, &d, &ContrastOptions::default());
        let p = findings.iter().find(|f| f.selector == "p#long").unwrap();
        assert_eq!(p.snippet.chars().count(), 60);
    }

    #[test]
    fn test_analyzer_reports_failures_only() {
        let source = Source::html(
            "page.html",
            r#"<html><body><p style="color:#000">Good</p><p style="color:#bbb">Bad</p></body></html>"#,
        );
        let findings = ContrastAnalyzer::default().analyze(&source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].wcag_criterion.as_deref(), Some("1.4.3"));
        assert!(findings[0].suggestion.as_ref().unwrap().starts_with("Use #"));
    }
}
