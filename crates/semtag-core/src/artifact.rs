//! Generated artifacts stored next to an element: a component AST and
//! component source code. Both are versioned JSON blobs under fixed keys.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use semtag_model::ElementId;

use crate::host::{ElementStorage, AST_DATA_KEY, COMPONENT_DATA_KEY};
use crate::StoreError;

pub const ARTIFACT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeInfo {
    pub id: ElementId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstMetadata {
    pub shape_info: ShapeInfo,
    #[serde(default)]
    pub html_code: String,
    #[serde(default)]
    pub css_code: String,
    #[serde(default)]
    pub meta_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstArtifact {
    pub ast: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub version: String,
    pub metadata: AstMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    pub shape_info: ShapeInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentArtifact {
    pub component_code: String,
    pub timestamp: i64,
    pub version: String,
    pub metadata: ComponentMetadata,
}

impl AstArtifact {
    pub fn new(ast: impl Into<String>, timestamp: i64, metadata: AstMetadata) -> Self {
        Self {
            ast: ast.into(),
            timestamp,
            version: ARTIFACT_VERSION.to_string(),
            metadata,
        }
    }
}

impl ComponentArtifact {
    pub fn new(code: impl Into<String>, timestamp: i64, metadata: ComponentMetadata) -> Self {
        Self {
            component_code: code.into(),
            timestamp,
            version: ARTIFACT_VERSION.to_string(),
            metadata,
        }
    }
}

pub fn save_ast<S: ElementStorage + ?Sized>(
    storage: &mut S,
    id: &ElementId,
    artifact: &AstArtifact,
) -> Result<(), StoreError> {
    save(storage, id, AST_DATA_KEY, artifact)
}

pub fn load_ast<S: ElementStorage + ?Sized>(storage: &S, id: &ElementId) -> Option<AstArtifact> {
    load(storage, id, AST_DATA_KEY)
}

pub fn clear_ast<S: ElementStorage + ?Sized>(
    storage: &mut S,
    id: &ElementId,
) -> Result<(), StoreError> {
    storage.set_data(id, AST_DATA_KEY, "")?;
    Ok(())
}

pub fn save_component<S: ElementStorage + ?Sized>(
    storage: &mut S,
    id: &ElementId,
    artifact: &ComponentArtifact,
) -> Result<(), StoreError> {
    save(storage, id, COMPONENT_DATA_KEY, artifact)
}

pub fn load_component<S: ElementStorage + ?Sized>(
    storage: &S,
    id: &ElementId,
) -> Option<ComponentArtifact> {
    load(storage, id, COMPONENT_DATA_KEY)
}

pub fn clear_component<S: ElementStorage + ?Sized>(
    storage: &mut S,
    id: &ElementId,
) -> Result<(), StoreError> {
    storage.set_data(id, COMPONENT_DATA_KEY, "")?;
    Ok(())
}

fn save<S, T>(storage: &mut S, id: &ElementId, key: &str, value: &T) -> Result<(), StoreError>
where
    S: ElementStorage + ?Sized,
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    storage.set_data(id, key, &raw)?;
    debug!("Saved {key} on element {id}");
    Ok(())
}

/// Missing, unreadable and malformed data all read as `None`.
fn load<S, T>(storage: &S, id: &ElementId, key: &str) -> Option<T>
where
    S: ElementStorage + ?Sized,
    T: DeserializeOwned,
{
    let raw = match storage.get_data(id, key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Cannot read {key} on element {id}: {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Malformed {key} on element {id}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use semtag_model::{ElementKind, ElementRef};

    fn id(s: &str) -> ElementId {
        ElementId::new(s).unwrap()
    }

    fn document() -> MemoryDocument {
        let mut doc = MemoryDocument::new("File", "Page");
        doc.insert(None, ElementRef::new(id("1"), "Card", ElementKind::Frame))
            .unwrap();
        doc
    }

    fn ast_metadata() -> AstMetadata {
        AstMetadata {
            shape_info: ShapeInfo {
                id: id("1"),
                name: "Card".into(),
            },
            html_code: "<article></article>".into(),
            css_code: String::new(),
            meta_info: "{}".into(),
        }
    }

    #[test]
    fn test_ast_save_load_clear() {
        let mut doc = document();
        let artifact = AstArtifact::new(r#"{"type":"Card"}"#, 1_700_000_000_000, ast_metadata());
        save_ast(&mut doc, &id("1"), &artifact).unwrap();
        assert_eq!(load_ast(&doc, &id("1")), Some(artifact));

        clear_ast(&mut doc, &id("1")).unwrap();
        assert_eq!(load_ast(&doc, &id("1")), None);
    }

    #[test]
    fn test_component_json_shape() {
        let mut doc = document();
        let artifact = ComponentArtifact::new(
            "export const Card = () => null;",
            42,
            ComponentMetadata {
                shape_info: ShapeInfo {
                    id: id("1"),
                    name: "Card".into(),
                },
                ast_data: None,
            },
        );
        save_component(&mut doc, &id("1"), &artifact).unwrap();

        let raw = doc.get_data(&id("1"), COMPONENT_DATA_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["componentCode"], "export const Card = () => null;");
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["metadata"]["shapeInfo"]["name"], "Card");
        assert_eq!(load_component(&doc, &id("1")), Some(artifact));
    }

    #[test]
    fn test_malformed_artifact_reads_as_none() {
        let mut doc = document();
        doc.set_data(&id("1"), AST_DATA_KEY, "{\"ast\":").unwrap();
        assert_eq!(load_ast(&doc, &id("1")), None);
        assert_eq!(load_component(&doc, &id("missing")), None);
    }

    #[test]
    fn test_save_on_missing_element_fails() {
        let mut doc = document();
        let artifact = AstArtifact::new("{}", 0, ast_metadata());
        assert!(matches!(
            save_ast(&mut doc, &id("nope"), &artifact),
            Err(StoreError::Host(_))
        ));
    }
}
