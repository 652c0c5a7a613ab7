//! Tree export: the minimal forest induced by the tagged elements.
//!
//! Walks the document depth-first in sibling order. Tagged elements become
//! nodes; untagged elements are passed through, so their tagged descendants
//! attach to the nearest tagged ancestor (or become roots). Sibling order is
//! never changed.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use semtag_model::{ElementId, ExportForest, ExportMetadata, ExportNode};

use crate::host::DocumentTree;
use crate::settings::ExportSettings;
use crate::store::TagStore;

/// Build the export forest for `store` over `document`.
pub fn build_forest<D>(store: &TagStore, document: &D, metadata: ExportMetadata) -> ExportForest
where
    D: DocumentTree + ?Sized,
{
    let mut walk = Walk {
        store,
        document,
        visited: HashSet::new(),
        emitted: 0,
    };

    let mut tree = Vec::new();
    if !store.is_empty() {
        for root in document.roots() {
            walk.collect(&root, &mut tree);
        }
    }

    if walk.emitted < store.len() {
        warn!(
            "{} tagged elements are no longer in the document and were not exported",
            store.len() - walk.emitted
        );
    }
    info!("Exported {} tagged elements in {} roots", walk.emitted, tree.len());

    ExportForest { metadata, tree }
}

/// Export header for a document, stamped with `now`.
pub fn export_metadata<D>(settings: &ExportSettings, document: &D, now: DateTime<Utc>) -> ExportMetadata
where
    D: DocumentTree + ?Sized,
{
    ExportMetadata {
        plugin_name: settings.plugin_name.clone(),
        version: settings.version.clone(),
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        file_name: document.file_name(),
        page_name: document.page_name(),
    }
}

struct Walk<'a, D: ?Sized> {
    store: &'a TagStore,
    document: &'a D,
    visited: HashSet<ElementId>,
    emitted: usize,
}

impl<D: DocumentTree + ?Sized> Walk<'_, D> {
    /// Append the kept nodes of the subtree at `id` to `out`.
    fn collect(&mut self, id: &ElementId, out: &mut Vec<ExportNode>) {
        if !self.visited.insert(id.clone()) {
            warn!("Element {id} reached twice while exporting; hierarchy is not a tree");
            return;
        }

        let mut kept = Vec::new();
        for child in self.document.children(id) {
            self.collect(&child, &mut kept);
        }

        match self.store.get(id.as_str()) {
            Some(record) => {
                self.emitted += 1;
                out.push(ExportNode::from_record(record, kept));
            }
            // Pass-through: hoist the kept descendants in place.
            None => out.extend(kept),
        }
    }
}
