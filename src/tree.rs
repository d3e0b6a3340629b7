// SPDX-License-Identifier: PMPL-1.0-or-later
//! Capabilities the contrast scanner needs from a rendered content tree.
//!
//! The scanner never touches a rendering engine directly. Structure comes
//! from [`ContentTree`], computed style from an injected [`StyleResolver`],
//! so the same scan runs over a parsed HTML document or a hand-built fake.

/// Read-only access to an element tree
pub trait ContentTree {
    /// Cheap handle to one element
    type Node: Copy + Eq;

    /// Element the scan starts below (typically `<body>`)
    fn root(&self) -> Self::Node;

    /// Element children in document order
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Parent element, `None` at the top of the tree
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Previous element sibling
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Lowercase element name
    fn tag_name(&self, node: Self::Node) -> &str;

    /// Attribute value, if present
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Concatenated text of the element and all its descendants
    fn text_content(&self, node: Self::Node) -> String;
}

/// Computed style lookups, as a browser's `getComputedStyle` would answer them
pub trait StyleResolver<N> {
    /// Foreground color as written (e.g. `rgb(0, 0, 0)` or `#333`)
    fn color(&self, node: N) -> Option<String>;

    /// Background color as written; `None` means no background
    fn background_color(&self, node: N) -> Option<String>;

    /// Font size in CSS pixels
    fn font_size(&self, node: N) -> Option<f64>;

    /// Numeric font weight (400 normal, 700 bold)
    fn font_weight(&self, node: N) -> Option<u32>;

    /// Whether the element produces a layout box
    fn is_visible(&self, node: N) -> bool;
}
