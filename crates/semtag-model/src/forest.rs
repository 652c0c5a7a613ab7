//! Export forest: the pruned, nested projection of tagged elements.

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, ElementKind};
use crate::record::{Properties, TagRecord};
use crate::style::{LayoutBag, StyleBag};

/// Static export header, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    #[serde(default)]
    pub plugin_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub page_name: String,
}

/// A tagged element with its kept descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportNode {
    pub tag: String,
    pub element_id: ElementId,
    #[serde(default)]
    pub element_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementKind>,
    #[serde(default)]
    pub attributes: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutBag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExportNode>,
}

impl ExportNode {
    pub fn from_record(record: &TagRecord, children: Vec<ExportNode>) -> Self {
        Self {
            tag: record.tag.clone(),
            element_id: record.element_id.clone(),
            element_name: record.element_name.clone(),
            element_type: record.element_type,
            attributes: record.properties.clone(),
            content: record.content.clone(),
            styles: record.styles.clone(),
            layout: record.layout.clone(),
            children,
        }
    }

    /// This node plus all descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ExportNode::node_count).sum::<usize>()
    }
}

/// Result of an export request. Rebuilt on every request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportForest {
    #[serde(default)]
    pub metadata: ExportMetadata,
    #[serde(default)]
    pub tree: Vec<ExportNode>,
}

impl ExportForest {
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.tree.iter().map(ExportNode::node_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementRef;

    fn node(id: &str, children: Vec<ExportNode>) -> ExportNode {
        let el = ElementRef::new(ElementId::new(id).unwrap(), id, ElementKind::Frame);
        ExportNode::from_record(&TagRecord::new("div", &Properties::new(), &el), children)
    }

    #[test]
    fn test_node_count() {
        let forest = ExportForest {
            metadata: ExportMetadata::default(),
            tree: vec![node("a", vec![node("b", vec![node("c", vec![])])]), node("d", vec![])],
        };
        assert_eq!(forest.node_count(), 4);
    }

    #[test]
    fn test_leaf_serializes_without_children() {
        let value = serde_json::to_value(node("a", vec![])).unwrap();
        assert!(value.get("children").is_none());
        assert_eq!(value["attributes"], serde_json::json!({}));
    }

    #[test]
    fn test_metadata_camel_case() {
        let forest = ExportForest {
            metadata: ExportMetadata {
                plugin_name: "Semantic Tagging".into(),
                version: "1.0.0".into(),
                export_date: "2024-01-01T00:00:00Z".into(),
                file_name: "Landing".into(),
                page_name: "Page 1".into(),
            },
            tree: Vec::new(),
        };
        let value = serde_json::to_value(&forest).unwrap();
        assert_eq!(value["metadata"]["pluginName"], "Semantic Tagging");
        assert_eq!(value["metadata"]["pageName"], "Page 1");
        assert_eq!(value["tree"], serde_json::json!([]));
    }
}
