//! Semtag Code Generator
//!
//! Turns an exported tag forest into HTML and CSS text. Both outputs share
//! one class-name assignment pass, so every CSS rule selects exactly the
//! element it was generated for.
//!
//! ```text
//! ExportForest → from_forest() → [GeneratorNode] → generate() → GeneratedCode { html, css }
//! ```
//!
//! Generation is pure and deterministic. A node with a missing or invalid
//! tag is skipped and its children are emitted in its place.

pub mod css;
pub mod html;
pub mod node;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use css::{slug_from_name, ClassNames};
pub use html::{escape_html, is_void_element};
pub use node::{from_forest, GeneratorNode};

/// The generated markup and stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub html: String,
    pub css: String,
}

/// Code generation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Codegen error: {message}")]
pub struct CodegenError {
    pub message: String,
}

impl From<serde_json::Error> for CodegenError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            message: format!("invalid input JSON: {e}"),
        }
    }
}

pub fn generate_html(nodes: &[GeneratorNode]) -> String {
    html::generate(nodes)
}

pub fn generate_css(nodes: &[GeneratorNode]) -> String {
    css::generate(nodes)
}

/// Generate HTML and CSS in one pass over the class names.
pub fn generate(nodes: &[GeneratorNode]) -> GeneratedCode {
    let classes = ClassNames::assign(nodes);
    GeneratedCode {
        html: html::generate_with(nodes, &classes),
        css: css::generate_with(nodes, &classes),
    }
}

/// Decode generator input from JSON: an export forest (`{"tree": [...]}`),
/// an array of nodes, or a single node. Entries that are not nodes are
/// skipped; attributes and styles keep the order they have in the source.
pub fn parse_nodes(source: &str) -> Result<Vec<GeneratorNode>, CodegenError> {
    let value: Value = serde_json::from_str(source)?;
    decode_nodes(value)
}

/// Like [`parse_nodes`], from an already parsed JSON value.
pub fn decode_nodes(value: Value) -> Result<Vec<GeneratorNode>, CodegenError> {
    match value {
        Value::Array(items) => Ok(node::decode_list(items)),
        Value::Object(mut map) => match map.remove("tree") {
            Some(Value::Array(items)) => Ok(node::decode_list(items)),
            Some(other) => Err(CodegenError {
                message: format!("expected \"tree\" to be a node array, found {other}"),
            }),
            None => Ok(vec![serde_json::from_value(Value::Object(map))?]),
        },
        other => Err(CodegenError {
            message: format!("expected a forest, a node array or a node, found {other}"),
        }),
    }
}

pub fn generate_from_json(source: &str) -> Result<GeneratedCode, CodegenError> {
    Ok(generate(&parse_nodes(source)?))
}

/// Tag names: an ASCII letter, then ASCII alphanumerics, `-`, `_`, `.` or `:`.
/// Component names such as `MuiButton` are valid.
pub fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
        }
        _ => false,
    }
}

pub(crate) fn count_nodes(nodes: &[GeneratorNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}
