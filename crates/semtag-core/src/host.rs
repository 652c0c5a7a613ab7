//! Seams to the host runtime: the read-only document hierarchy and the
//! per-element key/value storage.

use semtag_model::{ElementId, ElementRef};

/// Storage key holding an element's serialized [`semtag_model::TagRecord`].
pub const TAG_DATA_KEY: &str = "semantic-tag";
/// Storage key holding a generated component AST.
pub const AST_DATA_KEY: &str = "component-ast";
/// Storage key holding generated component code.
pub const COMPONENT_DATA_KEY: &str = "react-component";

/// Host-side failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Duplicate element: {0}")]
    DuplicateElement(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

/// Read-only access to the design document's containment tree.
///
/// Children and roots are returned in document (sibling) order.
pub trait DocumentTree {
    fn element(&self, id: &ElementId) -> Option<ElementRef>;

    fn roots(&self) -> Vec<ElementId>;

    fn children(&self, id: &ElementId) -> Vec<ElementId>;

    fn parent(&self, id: &ElementId) -> Option<ElementId>;

    /// Currently selected elements, in selection order.
    fn selection(&self) -> Vec<ElementId>;

    fn file_name(&self) -> String;

    fn page_name(&self) -> String;

    fn contains(&self, id: &ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Descendants of `id` in depth-first pre-order, excluding `id` itself.
    fn descendants(&self, id: &ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            stack.extend(self.children(&next).into_iter().rev());
            out.push(next);
        }
        out
    }

    /// Every element of the document in depth-first pre-order.
    fn all_elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        for root in self.roots() {
            let descendants = self.descendants(&root);
            out.push(root);
            out.extend(descendants);
        }
        out
    }
}

/// Key/value storage scoped to each document element.
///
/// An empty string and a missing key both mean "no data".
pub trait ElementStorage {
    fn get_data(&self, id: &ElementId, key: &str) -> Result<Option<String>, HostError>;

    fn set_data(&mut self, id: &ElementId, key: &str, value: &str) -> Result<(), HostError>;
}
