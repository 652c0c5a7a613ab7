//! Persisted tagging metadata for one element.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::element::{ElementId, ElementKind, ElementRef};
use crate::style::{LayoutBag, StyleBag};

/// Tag properties / markup attributes, kept in insertion order.
pub type Properties = IndexMap<String, String>;

/// The unit of tagging.
///
/// Stored flat, keyed by `element_id`; never carries children. `tag` and
/// `properties` belong to the tagging form, `content`/`styles`/`layout` to
/// the host snapshot taken when the record was first created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub tag: String,
    #[serde(default)]
    pub properties: Properties,
    pub element_id: ElementId,
    #[serde(default)]
    pub element_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutBag>,
}

impl TagRecord {
    /// Create a record for `element`, seeding the host-owned fields from its snapshot.
    pub fn new(tag: impl Into<String>, properties: &Properties, element: &ElementRef) -> Self {
        Self {
            tag: tag.into(),
            properties: sanitize_properties(properties),
            element_id: element.id.clone(),
            element_name: element.display_name().to_string(),
            element_type: Some(element.kind),
            content: element.content.clone().filter(|c| !c.trim().is_empty()),
            styles: element.styles.clone().filter(|s| !s.is_empty()),
            layout: element
                .layout
                .clone()
                .filter(|l| element.kind.is_container() && !l.is_empty()),
        }
    }

    /// Overwrite the form-owned fields. Host-owned fields stay untouched.
    pub fn retag(&mut self, tag: impl Into<String>, properties: &Properties) {
        self.tag = tag.into();
        self.properties = sanitize_properties(properties);
    }
}

/// Copy of `properties` with keys and values trimmed and blank entries dropped.
pub fn sanitize_properties(properties: &Properties) -> Properties {
    properties
        .iter()
        .filter_map(|(key, value)| {
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}
