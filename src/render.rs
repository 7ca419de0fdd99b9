//! HTML Rendering for view trees
//!
//! Renders editing and export view trees to HTML strings.

use crate::attr::Attrs;
use crate::view::{ViewElement, ViewNode};

// =============================================================================
// RenderConfig
// =============================================================================

/// Configuration for HTML rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Whether void elements are written as `<br />` rather than `<br>`.
    pub self_close_void: bool,
    /// Whether consecutive top-level blocks are separated by a newline.
    pub block_newlines: bool,
}

impl RenderConfig {
    /// Compact HTML (`<br>`, no separators).
    pub const COMPACT: Self = Self {
        self_close_void: false,
        block_newlines: false,
    };

    /// XHTML-style void elements, one block per line.
    pub const PRETTY: Self = Self {
        self_close_void: true,
        block_newlines: true,
    };
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::COMPACT
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a sequence of top-level view nodes to HTML.
pub fn render_fragment(nodes: &[ViewNode], config: &RenderConfig) -> String {
    let mut output = String::new();
    for (i, node) in nodes.iter().enumerate() {
        if config.block_newlines && i > 0 {
            output.push('\n');
        }
        render_node(node, config, &mut output);
    }
    output
}

/// Render a single view element to HTML.
pub fn render_view(elem: &ViewElement, config: &RenderConfig) -> String {
    let mut output = String::new();
    render_element(elem, config, &mut output);
    output
}

/// Render an element to HTML.
fn render_element(elem: &ViewElement, config: &RenderConfig, output: &mut String) {
    output.push('<');
    output.push_str(&elem.tag);
    render_attrs(&elem.attrs, output);

    // Void elements
    if is_void_element(&elem.tag) {
        output.push_str(if config.self_close_void { " />" } else { ">" });
        return;
    }

    output.push('>');
    for child in &elem.children {
        render_node(child, config, output);
    }
    output.push_str("</");
    output.push_str(&elem.tag);
    output.push('>');
}

/// Render a node to HTML.
fn render_node(node: &ViewNode, config: &RenderConfig, output: &mut String) {
    match node {
        ViewNode::Element(elem) => render_element(elem, config, output),
        ViewNode::Text(text) => escape_html_into(text, output),
    }
}

/// Render attributes to HTML.
fn render_attrs(attrs: &Attrs, output: &mut String) {
    for (name, value) in attrs.iter() {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        escape_attr_into(value, output);
        output.push('"');
    }
}

/// Escape HTML special characters.
fn escape_html_into(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value special characters.
fn escape_attr_into(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Check if element is a void element (self-closing).
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
