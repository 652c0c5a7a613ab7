//! HTML code generator.
//!
//! Walks the generator forest depth-first and emits one line per leaf
//! element, or an open line, the children, and a close line for elements
//! with children. Styled nodes get the class assigned by
//! [`ClassNames`](crate::css::ClassNames).

use tracing::warn;

use crate::css::ClassNames;
use crate::{is_valid_tag, GeneratorNode};

/// Generate HTML for a forest.
pub fn generate(nodes: &[GeneratorNode]) -> String {
    generate_with(nodes, &ClassNames::assign(nodes))
}

pub(crate) fn generate_with(nodes: &[GeneratorNode], classes: &ClassNames) -> String {
    let mut lines = Vec::new();
    let mut index = 0;
    for node in nodes {
        generate_node(node, classes, &mut index, &mut lines, 0);
    }
    lines.join("\n")
}

fn generate_node(
    node: &GeneratorNode,
    classes: &ClassNames,
    index: &mut usize,
    lines: &mut Vec<String>,
    depth: usize,
) {
    let class = classes.get(*index);
    *index += 1;

    // Malformed: promote the children in place.
    if !is_valid_tag(&node.tag) {
        warn!(
            "Skipping node {:?} with invalid tag {:?}",
            node.element_name, node.tag
        );
        for child in &node.children {
            generate_node(child, classes, index, lines, depth);
        }
        return;
    }

    let indent = "  ".repeat(depth);
    let open = open_tag(node, class);

    if is_void_element(&node.tag) {
        lines.push(format!("{indent}{open}"));
        // Void elements take no children; keep the pre-order cursor in step.
        let dropped = crate::count_nodes(&node.children);
        if dropped > 0 {
            warn!(
                "<{}> {:?} cannot have children; dropping {dropped} node(s)",
                node.tag, node.element_name
            );
        }
        *index += dropped;
        return;
    }

    if node.children.is_empty() {
        let text = node
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&node.element_name);
        lines.push(format!(
            "{indent}{open}{}</{}>",
            escape_html(text.trim()),
            node.tag
        ));
        return;
    }

    lines.push(format!("{indent}{open}"));
    for child in &node.children {
        generate_node(child, classes, index, lines, depth + 1);
    }
    lines.push(format!("{indent}</{}>", node.tag));
}

fn open_tag(node: &GeneratorNode, class: Option<&str>) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(&node.tag);

    // Generated class first, merged with an explicit one
    if let Some(class) = class {
        let merged = match node.attributes.get("class").map(|c| c.trim()) {
            Some(explicit) if !explicit.is_empty() => format!("{class} {explicit}"),
            _ => class.to_string(),
        };
        out.push_str(&format!(" class=\"{}\"", escape_html(&merged)));
    }

    for (key, value) in &node.attributes {
        if class.is_some() && key == "class" {
            continue;
        }
        if !is_valid_attribute_name(key) {
            warn!("Skipping invalid attribute name {key:?} on <{}>", node.tag);
            continue;
        }
        out.push_str(&format!(" {key}=\"{}\"", escape_html(value)));
    }

    out.push('>');
    out
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '='))
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Check if an HTML tag is a void element (self-closing, no children).
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(tag: &str, name: &str) -> GeneratorNode {
        GeneratorNode::new(tag, name)
    }

    // =========================================================================
    // Basic elements
    // =========================================================================

    #[test]
    fn test_empty_forest() {
        assert_eq!(generate(&[]), "");
    }

    #[test]
    fn test_leaf_falls_back_to_element_name() {
        let nodes = vec![node("button", "CTA").with_attribute("type", "submit")];
        assert_eq!(generate(&nodes), "<button type=\"submit\">CTA</button>");
    }

    #[test]
    fn test_content_wins_over_name() {
        let nodes = vec![node("p", "Paragraph 1").with_content("Hello")];
        assert_eq!(generate(&nodes), "<p>Hello</p>");
    }

    #[test]
    fn test_blank_text() {
        let nodes = vec![node("div", "   ")];
        assert_eq!(generate(&nodes), "<div></div>");
    }

    #[test]
    fn test_text_and_attributes_escaped() {
        let nodes = vec![node("a", "Tom & \"Jerry\" <3")
            .with_attribute("href", "/x?a=1&b=2")
            .with_attribute("title", "it's")];
        assert_eq!(
            generate(&nodes),
            "<a href=\"/x?a=1&amp;b=2\" title=\"it&#39;s\">Tom &amp; &quot;Jerry&quot; &lt;3</a>"
        );
    }

    #[test]
    fn test_attribute_order_is_insertion_order() {
        let nodes = vec![node("input", "Email")
            .with_attribute("type", "email")
            .with_attribute("required", "true")
            .with_attribute("aria-label", "Email")];
        assert_eq!(
            generate(&nodes),
            "<input type=\"email\" required=\"true\" aria-label=\"Email\">"
        );
    }

    #[test]
    fn test_void_element_ignores_children() {
        let nodes = vec![node("img", "Logo")
            .with_attribute("alt", "Logo")
            .with_children(vec![node("span", "x")])];
        assert_eq!(generate(&nodes), "<img alt=\"Logo\">");
    }

    #[test]
    fn test_void_element_drops_tagged_subtree() {
        let nodes = vec![node("form", "Signup").with_children(vec![
            node("input", "Field").with_children(vec![
                node("label", "Email").with_style("color", "gray"),
                node("span", "Hint"),
            ]),
            node("button", "Send"),
        ])];
        assert_eq!(
            generate(&nodes),
            "<form>\n  <input>\n  <button>Send</button>\n</form>"
        );
    }

    #[test]
    fn test_invalid_attribute_name_skipped() {
        let nodes = vec![node("div", "Box")
            .with_attribute("on click", "x")
            .with_attribute("data-id", "7")];
        assert_eq!(generate(&nodes), "<div data-id=\"7\">Box</div>");
    }

    // =========================================================================
    // Nesting
    // =========================================================================

    #[test]
    fn test_nested_elements() {
        let nodes = vec![node("nav", "Menu").with_children(vec![
            node("ul", "List").with_children(vec![node("li", "Home"), node("li", "About")]),
        ])];
        assert_eq!(
            generate(&nodes),
            "<nav>\n  <ul>\n    <li>Home</li>\n    <li>About</li>\n  </ul>\n</nav>"
        );
    }

    #[test]
    fn test_multiple_roots() {
        let nodes = vec![node("header", "Top"), node("footer", "Bottom")];
        assert_eq!(generate(&nodes), "<header>Top</header>\n<footer>Bottom</footer>");
    }

    #[test]
    fn test_malformed_node_promotes_children() {
        let nodes = vec![node("section", "Page").with_children(vec![
            node("", "Broken").with_children(vec![node("h2", "Heading")]),
            node("not a tag", "Also broken"),
            node("p", "Text"),
        ])];
        assert_eq!(
            generate(&nodes),
            "<section>\n  <h2>Heading</h2>\n  <p>Text</p>\n</section>"
        );
    }

    // =========================================================================
    // Classes
    // =========================================================================

    #[test]
    fn test_styled_node_gets_class() {
        let nodes = vec![node("h1", "Hero Title").with_style("fontSize", "32px")];
        assert_eq!(generate(&nodes), "<h1 class=\"hero-title\">Hero Title</h1>");
    }

    #[test]
    fn test_explicit_class_merged() {
        let nodes = vec![
            node("div", "Card")
                .with_attribute("id", "c")
                .with_attribute("class", "shadow")
                .with_style("color", "red"),
            node("div", "Plain").with_attribute("class", "muted"),
        ];
        assert_eq!(
            generate(&nodes),
            "<div class=\"card shadow\" id=\"c\">Card</div>\n<div class=\"muted\">Plain</div>"
        );
    }

    #[test]
    fn test_classes_after_void_stay_aligned() {
        let nodes = vec![
            node("img", "Pic").with_children(vec![node("b", "Hidden").with_style("color", "red")]),
            node("p", "Note").with_style("color", "blue"),
        ];
        assert_eq!(generate(&nodes), "<img>\n<p class=\"note\">Note</p>");
    }
}
