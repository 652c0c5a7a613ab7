//! Message-driven session: one host, one tag store, one message at a time.

use chrono::Utc;
use tracing::{debug, info, warn};

use semtag_model::{ElementId, ExportForest};

use crate::artifact::{
    self, AstArtifact, AstMetadata, ComponentArtifact, ComponentMetadata, ShapeInfo,
};
use crate::autotag::{self, AutoTagOptions};
use crate::export::{build_forest, export_metadata};
use crate::host::{DocumentTree, ElementStorage};
use crate::protocol::{
    ApplyTagData, AstGeneratedData, AstLoadedData, AutoTagCompleteData, ComponentLoadedData,
    InboundMessage, OutboundMessage, SaveAstData, SaveComponentData, SelectionItem,
    TagRemovedData,
};
use crate::settings::Settings;
use crate::store::TagStore;
use crate::StoreError;

const NO_AUTO_TAG_SELECTION: &str = "Please select at least one group or layer.";
const NO_TAG_TO_REMOVE: &str = "No tag on the selected elements";

pub struct Session<H> {
    host: H,
    store: TagStore,
    settings: Settings,
}

impl<H: DocumentTree + ElementStorage> Session<H> {
    /// Hydrate the store from `host` and return the session together with
    /// the initial `tags-loaded` message.
    pub fn start(host: H, settings: Settings) -> (Self, OutboundMessage) {
        let mut store = TagStore::new();
        store.load(&host);
        let session = Self {
            host,
            store,
            settings,
        };
        let loaded = session.tags_loaded();
        (session, loaded)
    }

    pub fn tags_loaded(&self) -> OutboundMessage {
        OutboundMessage::TagsLoaded {
            data: self.store.records(),
        }
    }

    /// Decode and handle a raw envelope. Malformed input is logged and ignored.
    pub fn handle_json(&mut self, raw: &str) -> Vec<OutboundMessage> {
        match InboundMessage::from_json(raw) {
            Ok(message) => self.handle(message),
            Err(e) => {
                warn!("Ignoring message: {e}");
                Vec::new()
            }
        }
    }

    pub fn handle(&mut self, message: InboundMessage) -> Vec<OutboundMessage> {
        match message {
            InboundMessage::GetSelection => vec![self.selection_update()],
            InboundMessage::ApplyTag { data } => self.apply_tag(data),
            InboundMessage::RemoveTag { data } => self.remove_tag(&data.element_ids),
            InboundMessage::ExportTags => vec![OutboundMessage::ExportData {
                data: self.export(),
            }],
            InboundMessage::AutoTagSelection { data } => self.auto_tag(&data.element_ids),
            InboundMessage::GenerateRichJson => {
                let data = if self.store.is_empty() {
                    ExportForest::default()
                } else {
                    self.export()
                };
                vec![OutboundMessage::RichJsonData { data }]
            }
            InboundMessage::SaveAst { data } => vec![self.save_ast(data)],
            InboundMessage::ClearAst { shape_id } => {
                self.clear_artifact(&shape_id, artifact::clear_ast);
                Vec::new()
            }
            InboundMessage::SaveReactComponent { data } => {
                self.save_component(data).into_iter().collect()
            }
            InboundMessage::ClearReactComponent { shape_id } => {
                self.clear_artifact(&shape_id, artifact::clear_component);
                Vec::new()
            }
        }
    }

    /// Messages describing the current selection: the selected elements,
    /// and any artifacts saved on the first one.
    pub fn selection_changed(&self) -> Vec<OutboundMessage> {
        let first = self.host.selection().into_iter().next();
        let ast = first
            .as_ref()
            .and_then(|id| artifact::load_ast(&self.host, id))
            .map(|a| AstLoadedData {
                ast: a.ast,
                timestamp: a.timestamp,
            });
        let component = first
            .as_ref()
            .and_then(|id| artifact::load_component(&self.host, id))
            .map(|c| ComponentLoadedData {
                component_code: c.component_code,
                timestamp: c.timestamp,
            });

        vec![
            self.selection_update(),
            OutboundMessage::AstLoaded { data: ast },
            OutboundMessage::ReactComponentLoaded { data: component },
        ]
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access. Tag data written here bypasses the store until
    /// the next [`Session::reload`].
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Re-read every persisted record and return the `tags-loaded` message.
    pub fn reload(&mut self) -> OutboundMessage {
        self.store.load(&self.host);
        self.tags_loaded()
    }

    pub fn into_host(self) -> H {
        self.host
    }

    // =====================================================================
    // Handlers
    // =====================================================================

    fn selection_update(&self) -> OutboundMessage {
        let data = self
            .host
            .selection()
            .into_iter()
            .filter_map(|id| self.host.element(&id))
            .map(|element| SelectionItem {
                name: element.display_name().to_string(),
                id: element.id,
                kind: element.kind,
            })
            .collect();
        OutboundMessage::SelectionUpdate { data }
    }

    fn apply_tag(&mut self, data: ApplyTagData) -> Vec<OutboundMessage> {
        let outcome = match self.store.apply(
            &mut self.host,
            &data.tag,
            &data.properties,
            &data.element_ids,
        ) {
            Ok(outcome) => outcome,
            Err(e) => return vec![OutboundMessage::error(e.to_string())],
        };

        let mut out: Vec<_> = outcome
            .applied
            .into_iter()
            .map(|record| OutboundMessage::TagApplied { data: record })
            .collect();
        out.extend(
            outcome
                .rejected
                .into_iter()
                .map(|(_, e)| OutboundMessage::error(shape_error(&StoreError::Host(e)))),
        );
        out
    }

    fn remove_tag(&mut self, element_ids: &[ElementId]) -> Vec<OutboundMessage> {
        let removed = self.store.remove(&mut self.host, element_ids);
        if removed.is_empty() {
            return vec![OutboundMessage::error(NO_TAG_TO_REMOVE)];
        }
        removed
            .into_iter()
            .map(|element_id| OutboundMessage::TagRemoved {
                data: TagRemovedData { element_id },
            })
            .collect()
    }

    fn auto_tag(&mut self, element_ids: &[ElementId]) -> Vec<OutboundMessage> {
        if element_ids.is_empty() {
            return vec![OutboundMessage::error(NO_AUTO_TAG_SELECTION)];
        }

        let options = AutoTagOptions::from(&self.settings.auto_tag);
        let result = autotag::auto_tag(&mut self.store, &mut self.host, element_ids, &options);

        let mut out: Vec<_> = result
            .applied_tags
            .into_iter()
            .map(|record| OutboundMessage::TagApplied { data: record })
            .collect();
        out.push(OutboundMessage::AutoTagComplete {
            data: AutoTagCompleteData {
                tagged_count: result.tagged_count,
                processed_elements: result.processed_elements,
            },
        });
        out
    }

    fn export(&self) -> ExportForest {
        let metadata = export_metadata(&self.settings.export, &self.host, Utc::now());
        build_forest(&self.store, &self.host, metadata)
    }

    fn save_ast(&mut self, data: SaveAstData) -> OutboundMessage {
        let Some(element) = self.host.element(&data.shape_id) else {
            return OutboundMessage::AstError {
                content: format!("Shape not found: {}", data.shape_id),
            };
        };

        let metadata = AstMetadata {
            shape_info: ShapeInfo {
                id: data.shape_id.clone(),
                name: element.display_name().to_string(),
            },
            html_code: data.metadata.html_output,
            css_code: data.metadata.css_output,
            meta_info: data.metadata.meta_info,
        };
        let record = AstArtifact::new(data.ast_data, Utc::now().timestamp_millis(), metadata);

        if let Err(e) = artifact::save_ast(&mut self.host, &data.shape_id, &record) {
            return OutboundMessage::AstError {
                content: shape_error(&e),
            };
        }
        info!("Saved AST on element {}", data.shape_id);

        let ast_data = serde_json::from_str(&record.ast).unwrap_or_else(|_| {
            debug!("AST is not valid JSON, echoing it as a string");
            serde_json::Value::String(record.ast.clone())
        });
        OutboundMessage::AstGenerated {
            data: AstGeneratedData {
                ast_data,
                success: true,
            },
        }
    }

    /// Saving a component is silent on success.
    fn save_component(&mut self, data: SaveComponentData) -> Option<OutboundMessage> {
        let Some(element) = self.host.element(&data.shape_id) else {
            return Some(OutboundMessage::ReactComponentError {
                content: format!("Shape not found: {}", data.shape_id),
            });
        };

        let metadata = ComponentMetadata {
            shape_info: ShapeInfo {
                id: data.shape_id.clone(),
                name: element.display_name().to_string(),
            },
            ast_data: artifact::load_ast(&self.host, &data.shape_id).map(|a| a.ast),
        };
        let record = ComponentArtifact::new(
            data.component_code,
            Utc::now().timestamp_millis(),
            metadata,
        );

        match artifact::save_component(&mut self.host, &data.shape_id, &record) {
            Ok(()) => {
                info!("Saved component on element {}", data.shape_id);
                None
            }
            Err(e) => Some(OutboundMessage::ReactComponentError {
                content: shape_error(&e),
            }),
        }
    }

    /// Clearing an artifact never reports back; failures are only logged.
    fn clear_artifact<F>(&mut self, id: &ElementId, clear: F)
    where
        F: FnOnce(&mut H, &ElementId) -> Result<(), StoreError>,
    {
        if !self.host.contains(id) {
            warn!("Cannot clear artifact on missing element {id}");
            return;
        }
        match clear(&mut self.host, id) {
            Ok(()) => debug!("Cleared artifact on element {id}"),
            Err(e) => warn!("Cannot clear artifact on element {id}: {e}"),
        }
    }
}

fn shape_error(error: &StoreError) -> String {
    match error {
        StoreError::Host(crate::HostError::ElementNotFound(id)) => format!("Shape not found: {id}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::protocol::{ElementIdsData, GeneratedOutput};
    use semtag_model::{ElementKind, ElementRef, Properties};
    use serde_json::json;

    fn id(s: &str) -> ElementId {
        ElementId::new(s).unwrap()
    }

    fn document() -> MemoryDocument {
        let mut doc = MemoryDocument::new("Shop", "Checkout");
        doc.insert(None, ElementRef::new(id("card"), "card/product", ElementKind::Frame))
            .unwrap();
        let mut cta = ElementRef::new(id("cta"), "button/submit", ElementKind::Rect);
        cta.content = Some("Buy".into());
        doc.insert(Some(&id("card")), cta).unwrap();
        doc.insert(Some(&id("card")), ElementRef::new(id("bg"), "Rectangle 1", ElementKind::Rect))
            .unwrap();
        doc.set_selection(vec![id("cta"), id("bg")]);
        doc
    }

    fn session() -> Session<MemoryDocument> {
        Session::start(document(), Settings::default()).0
    }

    fn apply(tag: &str, ids: &[&str]) -> InboundMessage {
        InboundMessage::ApplyTag {
            data: ApplyTagData {
                tag: tag.into(),
                properties: Properties::new(),
                element_ids: ids.iter().map(|s| id(s)).collect(),
            },
        }
    }

    fn types(messages: &[OutboundMessage]) -> Vec<&'static str> {
        messages.iter().map(OutboundMessage::message_type).collect()
    }

    // =====================================================================
    // Start-up and selection
    // =====================================================================

    #[test]
    fn test_start_emits_tags_loaded() {
        let mut doc = document();
        TagStore::new()
            .apply(&mut doc, "article", &Properties::new(), &[id("card")])
            .unwrap();

        let (session, loaded) = Session::start(doc, Settings::default());
        let OutboundMessage::TagsLoaded { data } = loaded else {
            panic!("expected tags-loaded");
        };
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].tag, "article");
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_get_selection() {
        let mut session = session();
        let out = session.handle(InboundMessage::GetSelection);
        let OutboundMessage::SelectionUpdate { data } = &out[0] else {
            panic!("expected selection-update");
        };
        let names: Vec<_> = data.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["button/submit", "Rectangle 1"]);
    }

    #[test]
    fn test_selection_changed_reports_artifacts() {
        let mut session = session();
        assert_eq!(
            session.selection_changed()[1],
            OutboundMessage::AstLoaded { data: None }
        );

        session.handle(InboundMessage::SaveAst {
            data: SaveAstData {
                ast_data: "{\"k\":1}".into(),
                shape_id: id("cta"),
                metadata: GeneratedOutput::default(),
            },
        });
        let out = session.selection_changed();
        assert_eq!(
            types(&out),
            vec!["selection-update", "ast-loaded", "react-component-loaded"]
        );
        let OutboundMessage::AstLoaded { data: Some(ast) } = &out[1] else {
            panic!("expected saved ast");
        };
        assert_eq!(ast.ast, "{\"k\":1}");
    }

    // =====================================================================
    // Tagging
    // =====================================================================

    #[test]
    fn test_apply_tag_emits_one_message_per_element() {
        let mut session = session();
        let out = session.handle(apply("button", &["cta", "bg"]));
        assert_eq!(types(&out), vec!["tag-applied", "tag-applied"]);
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn test_apply_tag_invalid_requests() {
        let mut session = session();
        assert_eq!(
            session.handle(apply("  ", &["cta"])),
            vec![OutboundMessage::error("Select or enter a tag")]
        );
        assert_eq!(
            session.handle(apply("div", &[])),
            vec![OutboundMessage::error("No elements selected")]
        );
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_blank_ids_still_answered() {
        let mut session = session();
        let out = session.handle_json(
            r#"{"type":"apply-tag","data":{"tag":"div","elementIds":[""]}}"#,
        );
        assert_eq!(out, vec![OutboundMessage::error("No elements selected")]);

        let out = session.handle_json(r#"{"type":"remove-tag","data":{"elementIds":[" "]}}"#);
        assert_eq!(out, vec![OutboundMessage::error(NO_TAG_TO_REMOVE)]);

        let out = session.handle_json(
            r#"{"type":"apply-tag","data":{"tag":"div","elementIds":["","cta"]}}"#,
        );
        assert_eq!(types(&out), vec!["tag-applied"]);
        assert!(session.store().contains("cta"));
    }

    #[test]
    fn test_apply_tag_missing_element() {
        let mut session = session();
        let out = session.handle(apply("div", &["cta", "ghost"]));
        assert_eq!(types(&out), vec!["tag-applied", "error"]);
        assert_eq!(out[1], OutboundMessage::error("Shape not found: ghost"));
    }

    #[test]
    fn test_remove_untagged_reports_error() {
        let mut session = session();
        session.handle(apply("div", &["cta"]));
        let out = session.handle(InboundMessage::RemoveTag {
            data: ElementIdsData {
                element_ids: vec![id("bg")],
            },
        });
        assert_eq!(out, vec![OutboundMessage::error(NO_TAG_TO_REMOVE)]);
        assert_eq!(session.store().len(), 1);

        let out = session.handle_json(r#"{"type":"remove-tag","data":{"elementIds":["nope"]}}"#);
        assert_eq!(out, vec![OutboundMessage::error(NO_TAG_TO_REMOVE)]);
        assert_eq!(session.store().len(), 1);

        let out = session.handle(InboundMessage::RemoveTag {
            data: ElementIdsData {
                element_ids: vec![id("cta")],
            },
        });
        assert_eq!(types(&out), vec!["tag-removed"]);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_auto_tag_selection() {
        let mut session = session();
        let out = session.handle(InboundMessage::AutoTagSelection {
            data: ElementIdsData {
                element_ids: vec![id("card"), id("cta"), id("bg")],
            },
        });
        assert_eq!(
            types(&out),
            vec!["tag-applied", "tag-applied", "auto-tag-complete"]
        );
        let OutboundMessage::AutoTagComplete { data } = out.last().unwrap() else {
            panic!("expected auto-tag-complete");
        };
        assert_eq!(data.tagged_count, 2);
        assert_eq!(data.processed_elements.len(), 3);
    }

    #[test]
    fn test_auto_tag_empty_selection() {
        let mut session = session();
        let out = session.handle(InboundMessage::AutoTagSelection {
            data: ElementIdsData {
                element_ids: Vec::new(),
            },
        });
        assert_eq!(out, vec![OutboundMessage::error(NO_AUTO_TAG_SELECTION)]);
    }

    // =====================================================================
    // Export
    // =====================================================================

    #[test]
    fn test_rich_json_on_empty_store() {
        let mut session = session();
        let out = session.handle(InboundMessage::GenerateRichJson);
        assert_eq!(
            out,
            vec![OutboundMessage::RichJsonData {
                data: ExportForest::default()
            }]
        );
    }

    #[test]
    fn test_export_tags_carries_metadata() {
        let mut session = session();
        session.handle(apply("button", &["cta"]));
        let out = session.handle(InboundMessage::ExportTags);
        let OutboundMessage::ExportData { data } = &out[0] else {
            panic!("expected export-data");
        };
        assert_eq!(data.metadata.file_name, "Shop");
        assert_eq!(data.metadata.page_name, "Checkout");
        assert_eq!(data.metadata.plugin_name, "Semantic Tagging");
        assert_eq!(data.node_count(), 1);
        assert_eq!(data.tree[0].content.as_deref(), Some("Buy"));
    }

    // =====================================================================
    // Artifacts
    // =====================================================================

    #[test]
    fn test_save_ast_echoes_parsed_or_raw() {
        let mut session = session();
        let save = |ast: &str| InboundMessage::SaveAst {
            data: SaveAstData {
                ast_data: ast.into(),
                shape_id: id("card"),
                metadata: GeneratedOutput::default(),
            },
        };

        let out = session.handle(save("{\"type\":\"Card\"}"));
        let OutboundMessage::AstGenerated { data } = &out[0] else {
            panic!("expected ast-generated");
        };
        assert_eq!(data.ast_data, json!({"type": "Card"}));
        assert!(data.success);

        let out = session.handle(save("not json"));
        let OutboundMessage::AstGenerated { data } = &out[0] else {
            panic!("expected ast-generated");
        };
        assert_eq!(data.ast_data, json!("not json"));
    }

    #[test]
    fn test_save_ast_missing_shape() {
        let mut session = session();
        let out = session.handle(InboundMessage::SaveAst {
            data: SaveAstData {
                ast_data: "{}".into(),
                shape_id: id("ghost"),
                metadata: GeneratedOutput::default(),
            },
        });
        assert_eq!(
            out,
            vec![OutboundMessage::AstError {
                content: "Shape not found: ghost".into()
            }]
        );
    }

    #[test]
    fn test_component_save_and_clear() {
        let mut session = session();
        let out = session.handle(InboundMessage::SaveReactComponent {
            data: SaveComponentData {
                component_code: "export default function Buy() {}".into(),
                shape_id: id("cta"),
            },
        });
        assert!(out.is_empty());
        assert!(artifact::load_component(session.host(), &id("cta")).is_some());

        let out = session.handle(InboundMessage::ClearReactComponent { shape_id: id("cta") });
        assert!(out.is_empty());
        assert!(artifact::load_component(session.host(), &id("cta")).is_none());
    }

    #[test]
    fn test_component_missing_shape() {
        let mut session = session();
        let out = session.handle(InboundMessage::SaveReactComponent {
            data: SaveComponentData {
                component_code: "x".into(),
                shape_id: id("ghost"),
            },
        });
        assert_eq!(types(&out), vec!["react-component-error"]);
    }

    #[test]
    fn test_handle_json_ignores_garbage() {
        let mut session = session();
        assert!(session.handle_json("{not json").is_empty());
        assert!(session.handle_json(r#"{"type":"theme"}"#).is_empty());
        assert_eq!(
            types(&session.handle_json(r#"{"type":"get-selection"}"#)),
            vec!["selection-update"]
        );
    }
}
