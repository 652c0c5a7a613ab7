//! The tag store: authoritative mapping from element id to [`TagRecord`].
//!
//! Hydrated once from the host's per-element storage with [`TagStore::load`],
//! then kept as the single writable copy. Every mutation is written through
//! to the host *before* the in-memory mapping changes, so a failed write
//! leaves both sides agreeing on the previous state for that element.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use semtag_model::{ElementId, Properties, TagRecord};

use crate::host::{DocumentTree, ElementStorage, HostError, TAG_DATA_KEY};
use crate::StoreError;

/// Result of an apply request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    /// Records created or overwritten, in request order.
    pub applied: Vec<TagRecord>,
    /// Elements that could not be tagged and why.
    pub rejected: Vec<(ElementId, HostError)>,
}

#[derive(Debug, Clone, Default)]
pub struct TagStore {
    records: IndexMap<ElementId, TagRecord>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the in-memory mapping with every record persisted on the
    /// document's elements. Corrupt or mismatched entries are dropped.
    pub fn load<H>(&mut self, host: &H) -> &IndexMap<ElementId, TagRecord>
    where
        H: DocumentTree + ElementStorage + ?Sized,
    {
        let mut records = IndexMap::new();
        let mut dropped = 0usize;

        for id in host.all_elements() {
            let raw = match host.get_data(&id, TAG_DATA_KEY) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Cannot read tag data for element {id}: {e}");
                    dropped += 1;
                    continue;
                }
            };

            match serde_json::from_str::<TagRecord>(&raw) {
                Ok(record) if record.element_id == id => {
                    records.insert(id, record);
                }
                Ok(record) => {
                    warn!(
                        "Tag data on element {id} belongs to {}. Skipping.",
                        record.element_id
                    );
                    dropped += 1;
                }
                Err(e) => {
                    warn!("Malformed tag data on element {id}: {e}. Skipping.");
                    dropped += 1;
                }
            }
        }

        info!("Loaded {} tagged elements ({dropped} dropped)", records.len());
        self.records = records;
        &self.records
    }

    /// Tag every element in `element_ids` with `tag` and a sanitized copy of
    /// `properties`. Re-applying overwrites tag and properties and refreshes
    /// the element name and type; content, styles and layout are kept.
    pub fn apply<H>(
        &mut self,
        host: &mut H,
        tag: &str,
        properties: &Properties,
        element_ids: &[ElementId],
    ) -> Result<ApplyOutcome, StoreError>
    where
        H: DocumentTree + ElementStorage + ?Sized,
    {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(StoreError::EmptyTag);
        }
        if element_ids.is_empty() {
            return Err(StoreError::NoElements);
        }

        let mut outcome = ApplyOutcome::default();

        for id in element_ids {
            let Some(element) = host.element(id) else {
                warn!("Cannot tag missing element {id}");
                outcome
                    .rejected
                    .push((id.clone(), HostError::ElementNotFound(id.to_string())));
                continue;
            };

            let record = match self.records.get(id) {
                Some(existing) => {
                    let mut record = existing.clone();
                    record.retag(tag, properties);
                    record.element_name = element.display_name().to_string();
                    record.element_type = Some(element.kind);
                    record
                }
                None => TagRecord::new(tag, properties, &element),
            };

            match self.commit(host, record) {
                Ok(record) => outcome.applied.push(record),
                Err(StoreError::Host(e)) => outcome.rejected.push((id.clone(), e)),
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }

    /// Delete the records of `element_ids`. Ids without a record are skipped.
    /// Returns the ids actually removed.
    pub fn remove<H>(&mut self, host: &mut H, element_ids: &[ElementId]) -> Vec<ElementId>
    where
        H: ElementStorage + ?Sized,
    {
        let mut removed = Vec::new();

        for id in element_ids {
            if !self.records.contains_key(id) {
                debug!("No tag on element {id}, nothing to remove");
                continue;
            }

            match host.set_data(id, TAG_DATA_KEY, "") {
                // A vanished element has no persisted state left to disagree with.
                Ok(()) | Err(HostError::ElementNotFound(_)) => {
                    self.records.shift_remove(id);
                    debug!("Removed tag from element {id}");
                    removed.push(id.clone());
                }
                Err(e) => warn!("Cannot clear tag data on element {id}: {e}"),
            }
        }

        removed
    }

    /// Persist `record` and store it, replacing any record for the same element.
    pub fn commit<H>(&mut self, host: &mut H, record: TagRecord) -> Result<TagRecord, StoreError>
    where
        H: ElementStorage + ?Sized,
    {
        let raw = serde_json::to_string(&record)?;
        if let Err(e) = host.set_data(&record.element_id, TAG_DATA_KEY, &raw) {
            warn!("Cannot persist tag for element {}: {e}", record.element_id);
            return Err(e.into());
        }
        debug!("Tagged element {} as <{}>", record.element_id, record.tag);
        self.records
            .insert(record.element_id.clone(), record.clone());
        Ok(record)
    }

    /// Read-only view of the live mapping.
    pub fn get_all(&self) -> &IndexMap<ElementId, TagRecord> {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&TagRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Owned copies of every record, in insertion order.
    pub fn records(&self) -> Vec<TagRecord> {
        self.records.values().cloned().collect()
    }
}
