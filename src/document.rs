// SPDX-License-Identifier: PMPL-1.0-or-later
//! Static HTML documents as a scannable content tree.
//!
//! Parses markup with `scraper` into an owned element arena and emulates the
//! small part of CSS the contrast scan depends on: `<style>` rules applied in
//! source order (no specificity), inline `style` attributes, inheritance of
//! color, font and visibility, and user-agent defaults for headings and bold
//! elements. There is no layout; "rendered" means no `display: none` (or
//! `hidden`) on the element or an ancestor and not a metadata element.

use crate::color::parse_color;
use crate::tree::{ContentTree, StyleResolver};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Root font size in CSS pixels
const BASE_FONT_PX: f64 = 16.0;

/// Elements that never produce a layout box
const NON_RENDERED: &[&str] = &[
    "head", "script", "style", "title", "meta", "link", "template", "noscript",
];

/// User-agent font defaults: (tag, font-size, font-weight)
const UA_FONT_DEFAULTS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("h1", Some("2em"), Some("bold")),
    ("h2", Some("1.5em"), Some("bold")),
    ("h3", Some("1.17em"), Some("bold")),
    ("h4", Some("1em"), Some("bold")),
    ("h5", Some("0.83em"), Some("bold")),
    ("h6", Some("0.67em"), Some("bold")),
    ("b", None, Some("bold")),
    ("strong", None, Some("bold")),
    ("th", None, Some("bold")),
    ("small", Some("0.83em"), None),
];

static CSS_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Child(usize),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: HashMap<String, String>,
    parent: Option<usize>,
    previous_sibling: Option<usize>,
    children: Vec<usize>,
    content: Vec<Content>,
}

/// Declared (cascaded but not yet computed) property values
#[derive(Debug, Clone, Default)]
struct Declared {
    color: Option<String>,
    background_color: Option<String>,
    font_size: Option<String>,
    font_weight: Option<String>,
    display: Option<String>,
    visibility: Option<String>,
}

impl Declared {
    fn apply(&mut self, declarations: &str) {
        for decl in declarations.split(';') {
            let Some((property, value)) = decl.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().trim_end_matches("!important").trim().to_string();
            if value.is_empty() {
                continue;
            }
            match property.as_str() {
                "color" => self.color = Some(value),
                "background-color" => self.background_color = Some(value),
                // Only the single-color form of the shorthand is understood
                "background" if parse_color(&computed_color(&value)).is_some() => {
                    self.background_color = Some(value)
                }
                "font-size" => self.font_size = Some(value),
                "font-weight" => self.font_weight = Some(value),
                "display" => self.display = Some(value.to_ascii_lowercase()),
                "visibility" => self.visibility = Some(value.to_ascii_lowercase()),
                _ => {}
            }
        }
    }
}

/// Computed style for one element
#[derive(Debug, Clone)]
struct ComputedStyle {
    color: Option<String>,
    background_color: Option<String>,
    font_size: f64,
    font_weight: u32,
    rendered: bool,
    visibility_visible: bool,
}

/// A parsed HTML document with emulated computed style
#[derive(Debug, Clone)]
pub struct StaticDocument {
    elements: Vec<Element>,
    styles: Vec<ComputedStyle>,
    root: usize,
}

impl StaticDocument {
    /// Parse an HTML document. Malformed markup is recovered the way
    /// browsers do; parsing never fails.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut elements: Vec<Element> = Vec::new();
        let mut index = HashMap::new();

        let mut stack = vec![(document.root_element(), None::<usize>)];
        while let Some((el, parent)) = stack.pop() {
            let idx = elements.len();
            index.insert(el.id(), idx);

            let previous_sibling = parent.and_then(|p| elements[p].children.last().copied());
            if let Some(p) = parent {
                elements[p].children.push(idx);
            }

            elements.push(Element {
                tag: el.value().name().to_ascii_lowercase(),
                attrs: el
                    .value()
                    .attrs()
                    .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                    .collect(),
                parent,
                previous_sibling,
                children: Vec::new(),
                content: Vec::new(),
            });

            let children: Vec<ElementRef> = el.children().filter_map(ElementRef::wrap).collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(idx)));
            }
        }

        // Second pass: interleave text and element children in document order
        for (id, &idx) in &index {
            let Some(node) = document.tree.get(*id) else {
                continue;
            };
            let mut content = Vec::new();
            for child in node.children() {
                if let Some(text) = child.value().as_text() {
                    content.push(Content::Text(String::from(&**text)));
                } else if let Some(child_idx) = index.get(&child.id()) {
                    content.push(Content::Child(*child_idx));
                }
            }
            elements[idx].content = content;
        }

        let mut declared: Vec<Declared> = elements.iter().map(ua_declarations).collect();

        let style_selector = Selector::parse("style").expect("valid selector");
        for style_el in document.select(&style_selector) {
            let sheet = style_el.text().collect::<String>();
            for (selector_text, declarations) in parse_stylesheet(&sheet) {
                let selector = match Selector::parse(&selector_text) {
                    Ok(s) => s,
                    Err(_) => {
                        debug!("Ignoring unsupported selector: {}", selector_text);
                        continue;
                    }
                };
                for matched in document.select(&selector) {
                    if let Some(&idx) = index.get(&matched.id()) {
                        declared[idx].apply(&declarations);
                    }
                }
            }
        }

        for (idx, element) in elements.iter().enumerate() {
            if let Some(inline) = element.attrs.get("style") {
                declared[idx].apply(inline);
            }
        }

        let styles = compute_styles(&elements, &declared);

        let root = elements.iter().position(|e| e.tag == "body").unwrap_or(0);

        debug!("Parsed document with {} elements", elements.len());

        Self { elements, styles, root }
    }

    /// Number of elements in the document, including `<html>` and `<head>`
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the document has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// First element carrying the given id
    pub fn element_by_id(&self, id: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| e.attrs.get("id").map(String::as_str) == Some(id))
    }

    /// Rendered text of the scan root with whitespace collapsed
    pub fn text(&self) -> String {
        collapse_whitespace(&self.text_content(self.root))
    }
}

impl ContentTree for StaticDocument {
    type Node = usize;

    fn root(&self) -> usize {
        self.root
    }

    fn children(&self, node: usize) -> Vec<usize> {
        self.elements[node].children.clone()
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.elements[node].parent
    }

    fn previous_sibling(&self, node: usize) -> Option<usize> {
        self.elements[node].previous_sibling
    }

    fn tag_name(&self, node: usize) -> &str {
        &self.elements[node].tag
    }

    fn attribute(&self, node: usize, name: &str) -> Option<&str> {
        self.elements[node].attrs.get(name).map(String::as_str)
    }

    fn text_content(&self, node: usize) -> String {
        let mut out = String::new();
        let mut pending: Vec<&Content> = self.elements[node].content.iter().rev().collect();

        // Depth-first over the content lists, skipping non-rendered subtrees
        while let Some(item) = pending.pop() {
            match item {
                Content::Text(text) => out.push_str(text),
                Content::Child(child) => {
                    let child = &self.elements[*child];
                    if NON_RENDERED.contains(&child.tag.as_str()) {
                        continue;
                    }
                    pending.extend(child.content.iter().rev());
                }
            }
        }
        out
    }
}

impl StyleResolver<usize> for StaticDocument {
    fn color(&self, node: usize) -> Option<String> {
        self.styles[node].color.clone()
    }

    fn background_color(&self, node: usize) -> Option<String> {
        self.styles[node].background_color.clone()
    }

    fn font_size(&self, node: usize) -> Option<f64> {
        Some(self.styles[node].font_size)
    }

    fn font_weight(&self, node: usize) -> Option<u32> {
        Some(self.styles[node].font_weight)
    }

    fn is_visible(&self, node: usize) -> bool {
        let style = &self.styles[node];
        style.rendered && style.visibility_visible
    }
}

/// User-agent declarations for an element
fn ua_declarations(element: &Element) -> Declared {
    let mut declared = Declared::default();
    if let Some((_, size, weight)) = UA_FONT_DEFAULTS.iter().find(|(tag, _, _)| *tag == element.tag) {
        declared.font_size = size.map(str::to_string);
        declared.font_weight = weight.map(str::to_string);
    }
    if element.attrs.contains_key("hidden") {
        declared.display = Some("none".to_string());
    }
    declared
}

/// Split a stylesheet into (selector, declarations) pairs. At-rules are
/// skipped along with everything up to their matching closing brace.
fn parse_stylesheet(sheet: &str) -> Vec<(String, String)> {
    let sheet = CSS_COMMENT.replace_all(sheet, "");
    let mut rules = Vec::new();
    let mut rest: &str = &sheet;

    while let Some(open) = rest.find('{') {
        let Some(close) = matching_brace(rest, open) else {
            debug!("Unterminated block in stylesheet");
            break;
        };

        // Statement at-rules (`@import ...;`) and stray braces end at ; or }
        let prelude = rest[..open]
            .rsplit(|c: char| c == ';' || c == '}')
            .next()
            .unwrap_or_default()
            .trim();
        if !prelude.is_empty() && !prelude.starts_with('@') {
            rules.push((prelude.to_string(), rest[open + 1..close].to_string()));
        }

        rest = &rest[close + 1..];
    }

    rules
}

/// Byte index of the `}` closing the `{` at `open`
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Computed form of a declared color: CSS named colors become `rgb()`,
/// anything else is passed through for `parse_color` to judge
fn computed_color(value: &str) -> String {
    match named_color(&value.trim().to_ascii_lowercase()) {
        Some((r, g, b)) => format!("rgb({}, {}, {})", r, g, b),
        None => value.to_string(),
    }
}

/// The CSS basic color keywords, plus orange
fn named_color(name: &str) -> Option<(u8, u8, u8)> {
    match name {
        "white" => Some((255, 255, 255)),
        "black" => Some((0, 0, 0)),
        "red" => Some((255, 0, 0)),
        "green" => Some((0, 128, 0)),
        "blue" => Some((0, 0, 255)),
        "yellow" => Some((255, 255, 0)),
        "gray" | "grey" => Some((128, 128, 128)),
        "silver" => Some((192, 192, 192)),
        "maroon" => Some((128, 0, 0)),
        "olive" => Some((128, 128, 0)),
        "lime" => Some((0, 255, 0)),
        "aqua" | "cyan" => Some((0, 255, 255)),
        "teal" => Some((0, 128, 128)),
        "navy" => Some((0, 0, 128)),
        "fuchsia" | "magenta" => Some((255, 0, 255)),
        "purple" => Some((128, 0, 128)),
        "orange" => Some((255, 165, 0)),
        _ => None,
    }
}

/// Resolve computed styles top-down. The arena is in pre-order, so every
/// parent is computed before its children.
fn compute_styles(elements: &[Element], declared: &[Declared]) -> Vec<ComputedStyle> {
    let mut styles: Vec<ComputedStyle> = Vec::with_capacity(elements.len());

    for (idx, element) in elements.iter().enumerate() {
        let parent = element.parent.map(|p| styles[p].clone());
        let decl = &declared[idx];

        let parent_size = parent.as_ref().map(|p| p.font_size).unwrap_or(BASE_FONT_PX);
        let parent_weight = parent.as_ref().map(|p| p.font_weight).unwrap_or(400);
        let parent_color = parent.as_ref().and_then(|p| p.color.clone());

        let color = match decl.color.as_deref() {
            Some(v) if v.eq_ignore_ascii_case("inherit") || v.eq_ignore_ascii_case("currentcolor") => {
                parent_color
            }
            Some(v) => Some(computed_color(v)),
            None => parent_color,
        };

        let background_color = match decl.background_color.as_deref() {
            Some(v) if v.eq_ignore_ascii_case("currentcolor") => color.clone(),
            Some(v) if v.eq_ignore_ascii_case("inherit") => {
                parent.as_ref().and_then(|p| p.background_color.clone())
            }
            other => other.map(computed_color),
        };

        let font_size = decl
            .font_size
            .as_deref()
            .and_then(|v| parse_font_size(v, parent_size))
            .unwrap_or(parent_size);

        let font_weight = decl
            .font_weight
            .as_deref()
            .and_then(|v| parse_font_weight(v, parent_weight))
            .unwrap_or(parent_weight);

        let parent_rendered = parent.as_ref().map(|p| p.rendered).unwrap_or(true);
        let rendered = parent_rendered
            && !NON_RENDERED.contains(&element.tag.as_str())
            && decl.display.as_deref() != Some("none");

        let visibility_visible = match decl.visibility.as_deref() {
            Some("hidden") | Some("collapse") => false,
            Some("visible") => true,
            _ => parent.as_ref().map(|p| p.visibility_visible).unwrap_or(true),
        };

        styles.push(ComputedStyle {
            color,
            background_color,
            font_size,
            font_weight,
            rendered,
            visibility_visible,
        });
    }

    styles
}

/// Parse a CSS font-size into pixels relative to the parent size
fn parse_font_size(value: &str, parent_px: f64) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let keyword = match value.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(BASE_FONT_PX),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        "inherit" => Some(parent_px),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }

    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let n: f64 = number.parse().ok()?;

    let px = match unit.trim() {
        "px" => n,
        "pt" => n * 96.0 / 72.0,
        "em" => n * parent_px,
        "%" => n / 100.0 * parent_px,
        "rem" => n * BASE_FONT_PX,
        _ => return None,
    };

    (px.is_finite() && px > 0.0).then_some(px)
}

/// Parse a CSS font-weight relative to the parent weight
fn parse_font_weight(value: &str, parent_weight: u32) -> Option<u32> {
    match value.trim().to_ascii_lowercase().as_str() {
        "normal" => Some(400),
        "bold" => Some(700),
        "bolder" => Some((parent_weight + 300).min(900)),
        "lighter" => Some(parent_weight.saturating_sub(300).max(100)),
        "inherit" => Some(parent_weight),
        other => other.parse::<u32>().ok().filter(|w| (1..=1000).contains(w)),
    }
}

/// Collapse whitespace runs into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> StaticDocument {
        StaticDocument::parse(&format!("<html><head></head><body>{}</body></html>", body))
    }

    #[test]
    fn test_root_is_body() {
        let d = doc("<p>Hi</p>");
        assert_eq!(d.tag_name(d.root()), "body");
        let html = d.parent(d.root()).unwrap();
        assert_eq!(d.tag_name(html), "html");
        assert_eq!(d.parent(html), None);
    }

    #[test]
    fn test_children_and_siblings_in_order() {
        let d = doc("<ul id=\"list\"><li>a</li><li>b</li><li>c</li></ul>");
        let list = d.element_by_id("list").unwrap();
        let items = d.children(list);
        assert_eq!(items.len(), 3);
        assert_eq!(d.text_content(items[2]), "c");
        assert_eq!(d.previous_sibling(items[2]), Some(items[1]));
        assert_eq!(d.previous_sibling(items[0]), None);
    }

    #[test]
    fn test_text_content_interleaves_and_skips_scripts() {
        let d = doc("<p id=\"p\">Hello <b>bold</b> world<script>var x = 1;</script></p>");
        let p = d.element_by_id("p").unwrap();
        assert_eq!(d.text_content(p), "Hello bold world");
    }

    #[test]
    fn test_inline_style_and_inheritance() {
        let d = doc("<div id=\"outer\" style=\"color: #333; font-size: 20px\"><span id=\"inner\">x</span></div>");
        let inner = d.element_by_id("inner").unwrap();
        assert_eq!(d.color(inner).as_deref(), Some("#333"));
        assert_eq!(d.font_size(inner), Some(20.0));
        assert_eq!(d.background_color(inner), None);
    }

    #[test]
    fn test_background_not_inherited() {
        let d = doc("<div id=\"outer\" style=\"background-color: #000\"><span id=\"inner\">x</span></div>");
        let outer = d.element_by_id("outer").unwrap();
        let inner = d.element_by_id("inner").unwrap();
        assert_eq!(d.background_color(outer).as_deref(), Some("#000"));
        assert_eq!(d.background_color(inner), None);
    }

    #[test]
    fn test_background_shorthand_single_color_only() {
        let d = doc("<div id=\"a\" style=\"background: #fafafa\">x</div><div id=\"b\" style=\"background: url(x.png) #fff\">y</div>");
        assert_eq!(d.background_color(d.element_by_id("a").unwrap()).as_deref(), Some("#fafafa"));
        assert_eq!(d.background_color(d.element_by_id("b").unwrap()), None);
    }

    #[test]
    fn test_style_block_rules_apply_in_order_then_inline() {
        let d = StaticDocument::parse(
            "<html><head><style>/* theme */ .muted { color: #999; } p { font-weight: bold } @media print { p { color: red } }</style></head>\
             <body><p id=\"a\" class=\"muted\">x</p><p id=\"b\" class=\"muted\" style=\"color: #111\">y</p></body></html>",
        );
        let a = d.element_by_id("a").unwrap();
        let b = d.element_by_id("b").unwrap();
        assert_eq!(d.color(a).as_deref(), Some("#999"));
        assert_eq!(d.font_weight(a), Some(700));
        assert_eq!(d.color(b).as_deref(), Some("#111"));
    }

    #[test]
    fn test_at_rule_blocks_skipped_entirely() {
        let d = StaticDocument::parse(
            "<html><head><style>@import url(theme.css); p { color: #222 } \
             @media print { .a { color: #000 } .b { color: #eeeeee } } \
             @supports (display: grid) { @media screen { .b { color: #ddd } } .c { color: #ccc } } \
             .c { font-weight: bold }</style></head>\
             <body><p id=\"a\" class=\"a\">x</p><p id=\"b\" class=\"b\">y</p><p id=\"c\" class=\"c\">z</p></body></html>",
        );
        assert_eq!(d.color(d.element_by_id("a").unwrap()).as_deref(), Some("#222"));
        assert_eq!(d.color(d.element_by_id("b").unwrap()).as_deref(), Some("#222"));
        let c = d.element_by_id("c").unwrap();
        assert_eq!(d.color(c).as_deref(), Some("#222"));
        assert_eq!(d.font_weight(c), Some(700));
    }

    #[test]
    fn test_parse_stylesheet_pairs() {
        let rules = parse_stylesheet("h1, h2 { color: red } @font-face { src: x } a{}");
        assert_eq!(
            rules,
            vec![
                ("h1, h2".to_string(), " color: red ".to_string()),
                ("a".to_string(), String::new()),
            ]
        );
        assert!(parse_stylesheet("p { color: red").is_empty());
    }

    #[test]
    fn test_named_colors_computed_to_rgb() {
        let d = doc(
            "<div id=\"bg\" style=\"background-color: Black\"><p id=\"fg\" style=\"color: white\">x</p></div>\
             <div id=\"short\" style=\"background: navy\">y</div><p id=\"odd\" style=\"color: rebeccapurple\">z</p>",
        );
        assert_eq!(d.background_color(d.element_by_id("bg").unwrap()).as_deref(), Some("rgb(0, 0, 0)"));
        assert_eq!(d.color(d.element_by_id("fg").unwrap()).as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(d.background_color(d.element_by_id("short").unwrap()).as_deref(), Some("rgb(0, 0, 128)"));
        assert_eq!(d.color(d.element_by_id("odd").unwrap()).as_deref(), Some("rebeccapurple"));
    }

    #[test]
    fn test_heading_defaults() {
        let d = doc("<h1 id=\"h\">Title</h1><h2 id=\"h2\" style=\"font-weight: normal\">Sub</h2>");
        let h = d.element_by_id("h").unwrap();
        assert_eq!(d.font_size(h), Some(32.0));
        assert_eq!(d.font_weight(h), Some(700));
        let h2 = d.element_by_id("h2").unwrap();
        assert_eq!(d.font_size(h2), Some(24.0));
        assert_eq!(d.font_weight(h2), Some(400));
    }

    #[test]
    fn test_visibility_rules() {
        let d = doc(
            "<div id=\"none\" style=\"display:none\"><p id=\"child\">x</p></div>\
             <div id=\"hidden\" style=\"visibility:hidden\"><p id=\"shown\" style=\"visibility:visible\">y</p></div>\
             <p id=\"attr\" hidden>z</p>",
        );
        assert!(!d.is_visible(d.element_by_id("none").unwrap()));
        assert!(!d.is_visible(d.element_by_id("child").unwrap()));
        assert!(!d.is_visible(d.element_by_id("hidden").unwrap()));
        assert!(d.is_visible(d.element_by_id("shown").unwrap()));
        assert!(!d.is_visible(d.element_by_id("attr").unwrap()));
    }

    #[test]
    fn test_parse_font_size_units() {
        assert_eq!(parse_font_size("12px", 16.0), Some(12.0));
        assert_eq!(parse_font_size("18pt", 16.0), Some(24.0));
        assert_eq!(parse_font_size("1.5em", 20.0), Some(30.0));
        assert_eq!(parse_font_size("50%", 20.0), Some(10.0));
        assert_eq!(parse_font_size("2rem", 20.0), Some(32.0));
        assert_eq!(parse_font_size("large", 10.0), Some(18.0));
        assert_eq!(parse_font_size("calc(1em + 2px)", 16.0), None);
        assert_eq!(parse_font_size("-3px", 16.0), None);
    }

    #[test]
    fn test_parse_font_weight() {
        assert_eq!(parse_font_weight("bold", 400), Some(700));
        assert_eq!(parse_font_weight("600", 400), Some(600));
        assert_eq!(parse_font_weight("bolder", 700), Some(900));
        assert_eq!(parse_font_weight("lighter", 400), Some(100));
        assert_eq!(parse_font_weight("heavy", 400), None);
    }

    #[test]
    fn test_document_text() {
        let d = StaticDocument::parse("<html><head><title>T</title></head><body>\n  <h1>One</h1>\n<p>Two   three</p></body></html>");
        assert_eq!(d.text(), "One Two three");
    }
}
