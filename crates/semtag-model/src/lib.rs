//! Semtag data model
//!
//! Plain data shared by the tagging pipeline: element references supplied by
//! the design document, the style/layout property bags, the persisted
//! [`TagRecord`], and the [`ExportForest`] projection consumed by code
//! generation. No logic beyond validation and lookups lives here.
//!
//! ```text
//! ElementRef ──apply──▶ TagRecord ──build_forest──▶ ExportForest ──▶ codegen
//! ```
//!
//! # Example
//!
//! ```
//! use semtag_model::{ElementId, StyleBag};
//!
//! let id = ElementId::new("1:1").unwrap();
//! assert_eq!(id.as_str(), "1:1");
//!
//! let mut styles = StyleBag::default();
//! styles.set("fontSize", "16px");
//! assert_eq!(styles.get("fontSize"), Some("16px"));
//! ```

pub mod element;
pub mod forest;
pub mod record;
pub mod style;

pub use element::{ElementId, ElementKind, ElementRef};
pub use forest::{ExportForest, ExportMetadata, ExportNode};
pub use record::{sanitize_properties, Properties, TagRecord};
pub use style::{LayoutBag, StyleBag};

/// Model validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid element id: {0}")]
    InvalidElementId(String),
}
