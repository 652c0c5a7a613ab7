//! Message envelopes exchanged between the UI surface and the host.
//!
//! Every envelope is a JSON object discriminated by `type`; payloads travel
//! under `data` (or `shapeId` for the clear requests). Unknown discriminants
//! fail to decode and are never guessed at.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use semtag_model::{ElementId, ElementKind, ExportForest, Properties, TagRecord};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Cannot encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

// =========================================================================
// UI → host
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InboundMessage {
    GetSelection,
    ApplyTag {
        data: ApplyTagData,
    },
    RemoveTag {
        data: ElementIdsData,
    },
    ExportTags,
    AutoTagSelection {
        data: ElementIdsData,
    },
    GenerateRichJson,
    SaveAst {
        data: SaveAstData,
    },
    ClearAst {
        #[serde(rename = "shapeId")]
        shape_id: ElementId,
    },
    SaveReactComponent {
        data: SaveComponentData,
    },
    ClearReactComponent {
        #[serde(rename = "shapeId")]
        shape_id: ElementId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTagData {
    pub tag: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, deserialize_with = "element_ids")]
    pub element_ids: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementIdsData {
    #[serde(default, deserialize_with = "element_ids")]
    pub element_ids: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAstData {
    pub ast_data: String,
    pub shape_id: ElementId,
    #[serde(default)]
    pub metadata: GeneratedOutput,
}

/// Generator output the AST was derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutput {
    #[serde(default)]
    pub html_output: String,
    #[serde(default)]
    pub css_output: String,
    #[serde(default)]
    pub meta_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveComponentData {
    pub component_code: String,
    pub shape_id: ElementId,
}

/// Blank ids are dropped from the list instead of failing the envelope, so
/// the request still reaches its handler and gets an answer.
fn element_ids<'de, D>(deserializer: D) -> Result<Vec<ElementId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|id| match ElementId::new(id) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Dropping element id: {e}");
                None
            }
        })
        .collect())
}

impl InboundMessage {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::Decode)
    }
}

// =========================================================================
// Host → UI
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutboundMessage {
    SelectionUpdate {
        data: Vec<SelectionItem>,
    },
    TagApplied {
        data: TagRecord,
    },
    TagRemoved {
        data: TagRemovedData,
    },
    TagsLoaded {
        data: Vec<TagRecord>,
    },
    ExportData {
        data: ExportForest,
    },
    AutoTagComplete {
        data: AutoTagCompleteData,
    },
    RichJsonData {
        data: ExportForest,
    },
    AstGenerated {
        data: AstGeneratedData,
    },
    AstError {
        content: String,
    },
    AstLoaded {
        data: Option<AstLoadedData>,
    },
    ReactComponentLoaded {
        data: Option<ComponentLoadedData>,
    },
    ReactComponentError {
        content: String,
    },
    Error {
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub id: ElementId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRemovedData {
    pub element_id: ElementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTagCompleteData {
    pub tagged_count: usize,
    pub processed_elements: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstGeneratedData {
    /// The saved AST, parsed when it is valid JSON and verbatim otherwise.
    pub ast_data: serde_json::Value,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstLoadedData {
    pub ast: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLoadedData {
    pub component_code: String,
    pub timestamp: i64,
}

impl OutboundMessage {
    pub fn error(content: impl Into<String>) -> Self {
        OutboundMessage::Error {
            content: content.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// The `type` discriminant on the wire.
    pub fn message_type(&self) -> &'static str {
        match self {
            OutboundMessage::SelectionUpdate { .. } => "selection-update",
            OutboundMessage::TagApplied { .. } => "tag-applied",
            OutboundMessage::TagRemoved { .. } => "tag-removed",
            OutboundMessage::TagsLoaded { .. } => "tags-loaded",
            OutboundMessage::ExportData { .. } => "export-data",
            OutboundMessage::AutoTagComplete { .. } => "auto-tag-complete",
            OutboundMessage::RichJsonData { .. } => "rich-json-data",
            OutboundMessage::AstGenerated { .. } => "ast-generated",
            OutboundMessage::AstError { .. } => "ast-error",
            OutboundMessage::AstLoaded { .. } => "ast-loaded",
            OutboundMessage::ReactComponentLoaded { .. } => "react-component-loaded",
            OutboundMessage::ReactComponentError { .. } => "react-component-error",
            OutboundMessage::Error { .. } => "error",
        }
    }
}
