//! Element references handed over by the design document.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::style::{LayoutBag, StyleBag};
use crate::ModelError;

/// Stable identifier of a node in the design document.
///
/// Rules:
/// - Must be non-empty after trimming
/// - Compared and hashed exactly like the underlying string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::InvalidElementId(
                "Element ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ElementId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse element kind reported by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Frame,
    Group,
    Rect,
    Ellipse,
    Text,
    Image,
    Path,
    Bool,
    SvgRaw,
    #[serde(other)]
    Other,
}

impl ElementKind {
    /// Kinds that arrange children and therefore carry a meaningful layout.
    pub fn is_container(self) -> bool {
        matches!(self, ElementKind::Frame | ElementKind::Group | ElementKind::Bool)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Frame => "frame",
            ElementKind::Group => "group",
            ElementKind::Rect => "rect",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Path => "path",
            ElementKind::Bool => "bool",
            ElementKind::SvgRaw => "svg-raw",
            ElementKind::Other => "other",
        }
    }
}

/// Read-only view of one document element.
///
/// `content`, `styles` and `layout` are the host's rendering snapshot of the
/// element. They seed newly created tag records and are never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRef {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutBag>,
}

fn default_kind() -> ElementKind {
    ElementKind::Other
}

impl ElementRef {
    pub fn new(id: ElementId, name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            content: None,
            styles: None,
            layout: None,
        }
    }

    /// Name shown to the user; unnamed layers read as `"Unnamed"`.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            "Unnamed"
        } else {
            name
        }
    }
}
