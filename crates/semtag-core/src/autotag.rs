//! Auto-tagging: derive tags from layer names.
//!
//! Never overwrites: elements that already carry a record are skipped, so
//! running the engine twice over the same selection only tags the first time.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info, warn};

use semtag_model::{ElementId, TagRecord};

use crate::host::{DocumentTree, ElementStorage};
use crate::store::TagStore;
use crate::taxonomy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoTagOptions {
    /// Also consider every descendant of each selected element.
    pub include_descendants: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTagResult {
    pub applied_tags: Vec<TagRecord>,
    /// Number of newly created records.
    pub tagged_count: usize,
    /// Every element considered, skipped ones included.
    pub processed_elements: Vec<ElementId>,
}

pub fn auto_tag<H>(
    store: &mut TagStore,
    host: &mut H,
    element_ids: &[ElementId],
    options: &AutoTagOptions,
) -> AutoTagResult
where
    H: DocumentTree + ElementStorage + ?Sized,
{
    let mut candidates: IndexSet<ElementId> = IndexSet::new();
    for id in element_ids {
        candidates.insert(id.clone());
        if options.include_descendants {
            candidates.extend(host.descendants(id));
        }
    }

    let mut result = AutoTagResult::default();

    for id in candidates {
        result.processed_elements.push(id.clone());

        if store.contains(id.as_str()) {
            debug!("Element {id} already tagged, skipping");
            continue;
        }

        let Some(element) = host.element(&id) else {
            warn!("Cannot auto-tag missing element {id}");
            continue;
        };

        let Some(inference) = taxonomy::infer(&element.name) else {
            debug!("Layer name {:?} does not follow the naming convention", element.name);
            continue;
        };

        let record = TagRecord::new(inference.tag, &inference.properties, &element);
        match store.commit(host, record) {
            Ok(record) => result.applied_tags.push(record),
            Err(e) => warn!("Auto-tag of element {id} failed: {e}"),
        }
    }

    result.tagged_count = result.applied_tags.len();
    info!(
        "Auto-tagged {} of {} elements",
        result.tagged_count,
        result.processed_elements.len()
    );
    result
}
