//! Generator input: the minimal projection of an export node.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use semtag_model::{ExportForest, ExportNode, Properties};

/// One node of the forest handed to the HTML and CSS generators.
///
/// Decoding is lenient: every field may be missing or null. A missing or
/// invalid `tag` makes the node malformed; the generators skip it and
/// promote its children. Number and boolean attribute or style values are
/// kept as text; other non-text values are dropped with a warning, as are
/// children that are not objects. A `layout` object, if present, fills
/// style keys that `styles` leaves unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "NodeRepr")]
pub struct GeneratorNode {
    pub tag: String,
    pub element_name: String,
    pub attributes: Properties,
    /// Style values keyed by camelCase style name.
    pub styles: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GeneratorNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRepr {
    #[serde(default)]
    tag: Value,
    #[serde(default)]
    element_name: Value,
    #[serde(default)]
    attributes: Value,
    #[serde(default)]
    styles: Value,
    #[serde(default)]
    layout: Value,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    children: Value,
}

impl From<NodeRepr> for GeneratorNode {
    fn from(repr: NodeRepr) -> Self {
        let mut styles = text_map("styles", repr.styles);
        for (key, value) in text_map("layout", repr.layout) {
            styles.entry(key).or_insert(value);
        }
        let children = match repr.children {
            Value::Null => Vec::new(),
            Value::Array(items) => decode_list(items),
            other => {
                warn!("Ignoring children that are not an array: {other}");
                Vec::new()
            }
        };
        Self {
            tag: text("tag", repr.tag).unwrap_or_default(),
            element_name: text("elementName", repr.element_name).unwrap_or_default(),
            attributes: text_map("attributes", repr.attributes),
            styles,
            content: text("content", repr.content),
            children,
        }
    }
}

/// Decode each node on its own; an entry that is not a node is skipped.
pub(crate) fn decode_list(items: Vec<Value>) -> Vec<GeneratorNode> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("Skipping generator node: {e}");
                None
            }
        })
        .collect()
}

fn text(field: &str, value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => {
            warn!("Ignoring non-text {field} value {other}");
            None
        }
    }
}

fn text_map(field: &str, value: Value) -> IndexMap<String, String> {
    match value {
        Value::Null => IndexMap::new(),
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, value)| Some((key, text(field, value)?)))
            .collect(),
        other => {
            warn!("Ignoring {field} that is not an object: {other}");
            IndexMap::new()
        }
    }
}

impl GeneratorNode {
    pub fn new(tag: impl Into<String>, element_name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            element_name: element_name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_children(mut self, children: Vec<GeneratorNode>) -> Self {
        self.children = children;
        self
    }
}

impl From<&ExportNode> for GeneratorNode {
    fn from(node: &ExportNode) -> Self {
        let mut styles: IndexMap<String, String> = node
            .styles
            .iter()
            .flat_map(|bag| bag.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        for (key, value) in node.layout.iter().flat_map(|bag| bag.iter()) {
            styles
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }

        Self {
            tag: node.tag.clone(),
            element_name: node.element_name.clone(),
            attributes: node.attributes.clone(),
            styles,
            content: node.content.clone(),
            children: node.children.iter().map(GeneratorNode::from).collect(),
        }
    }
}

/// Generator roots for an export forest.
pub fn from_forest(forest: &ExportForest) -> Vec<GeneratorNode> {
    forest.tree.iter().map(GeneratorNode::from).collect()
}
