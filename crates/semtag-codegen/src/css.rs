//! CSS code generator.
//!
//! One rule per styled node, selected by a class derived from the node's
//! element name. Class names are assigned by a single pre-order pass shared
//! with the HTML generator, so markup and stylesheet always agree.

use std::collections::HashSet;

use semtag_model::StyleBag;
use tracing::warn;

use crate::html::is_void_element;
use crate::{is_valid_tag, GeneratorNode};

/// Class name per node, in pre-order over every node (malformed ones
/// included, which never get a class).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassNames {
    names: Vec<Option<String>>,
}

impl ClassNames {
    pub fn assign(nodes: &[GeneratorNode]) -> Self {
        let mut used = HashSet::new();
        let mut names = Vec::new();
        assign_node_classes(nodes, &mut used, &mut names);
        Self { names }
    }

    /// Class of the node at pre-order position `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).and_then(|n| n.as_deref())
    }
}

fn assign_node_classes(
    nodes: &[GeneratorNode],
    used: &mut HashSet<String>,
    names: &mut Vec<Option<String>>,
) {
    for node in nodes {
        let class = if is_valid_tag(&node.tag) && !declarations(node).is_empty() {
            Some(unique_class(base_class(node), used))
        } else {
            None
        };
        names.push(class);
        if is_valid_tag(&node.tag) && is_void_element(&node.tag) {
            // Never rendered, so never styled.
            names.extend(std::iter::repeat(None).take(crate::count_nodes(&node.children)));
        } else {
            assign_node_classes(&node.children, used, names);
        }
    }
}

fn base_class(node: &GeneratorNode) -> String {
    let slug = slug_from_name(&node.element_name);
    if !slug.is_empty() {
        return slug;
    }
    let slug = slug_from_name(&node.tag);
    if !slug.is_empty() {
        return slug;
    }
    "element".to_string()
}

/// First free name among `base`, `base-2`, `base-3`, …
fn unique_class(base: String, used: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Lowercase ASCII alphanumerics; every other run collapses to one `-`.
pub fn slug_from_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Emittable `(css property, value)` pairs of a node in canonical order:
/// known style keys first, then unknown keys sorted by name.
pub fn declarations(node: &GeneratorNode) -> Vec<(String, &str)> {
    let mut known = Vec::new();
    let mut unknown = Vec::new();

    for (key, value) in &node.styles {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if value.contains(['{', '}', ';']) || key.contains(['{', '}', ';', ':']) {
            warn!(
                "Skipping unsafe style {key}: {value:?} on {:?}",
                node.element_name
            );
            continue;
        }
        match StyleBag::canonical_index(key) {
            Some(index) => known.push((index, key.as_str(), value)),
            None => unknown.push((key.as_str(), value)),
        }
    }

    known.sort_by_key(|(index, _, _)| *index);
    unknown.sort_by(|a, b| a.0.cmp(b.0));

    known
        .into_iter()
        .map(|(_, key, value)| (css_property(key), value))
        .chain(unknown.into_iter().map(|(key, value)| (css_property(key), value)))
        .collect()
}

/// CSS property name for a camelCase style key.
/// `webkitTextFillColor` → `-webkit-text-fill-color`.
pub fn css_property(key: &str) -> String {
    if let Some(css) = StyleBag::css_property(key) {
        return css.to_string();
    }
    let mut out = String::new();
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if ["webkit-", "moz-", "ms-"].iter().any(|p| out.starts_with(p)) {
        out.insert(0, '-');
    }
    out
}

/// Generate CSS for a forest.
pub fn generate(nodes: &[GeneratorNode]) -> String {
    generate_with(nodes, &ClassNames::assign(nodes))
}

pub(crate) fn generate_with(nodes: &[GeneratorNode], classes: &ClassNames) -> String {
    let mut rules = Vec::new();
    let mut index = 0;
    collect_rules(nodes, classes, &mut index, &mut rules);
    rules.join("\n\n")
}

fn collect_rules(
    nodes: &[GeneratorNode],
    classes: &ClassNames,
    index: &mut usize,
    rules: &mut Vec<String>,
) {
    for node in nodes {
        if let Some(class) = classes.get(*index) {
            let mut rule = format!(".{class} {{\n");
            for (property, value) in declarations(node) {
                rule.push_str(&format!("  {property}: {value};\n"));
            }
            rule.push('}');
            rules.push(rule);
        }
        *index += 1;
        collect_rules(&node.children, classes, index, rules);
    }
}
