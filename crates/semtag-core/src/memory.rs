//! In-memory document host.
//!
//! Backs the CLI (documents loaded from JSON snapshots) and the tests. The
//! snapshot format nests children under their parent and keeps each
//! element's plugin data next to it:
//!
//! ```json
//! {
//!   "fileName": "Landing", "pageName": "Page 1", "selection": ["2"],
//!   "elements": [
//!     { "id": "1", "name": "hero", "type": "frame",
//!       "pluginData": { "semantic-tag": "{...}" },
//!       "children": [ { "id": "2", "name": "button/primary", "type": "rect" } ] }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use semtag_model::{ElementId, ElementRef};

use crate::host::{DocumentTree, ElementStorage, HostError};

/// Serializable form of a [`MemoryDocument`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub page_name: String,
    #[serde(default)]
    pub selection: Vec<ElementId>,
    #[serde(default)]
    pub elements: Vec<SnapshotElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotElement {
    #[serde(flatten)]
    pub element: ElementRef,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugin_data: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotElement>,
}

#[derive(Debug, Clone)]
struct Entry {
    element: ElementRef,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    data: IndexMap<String, String>,
}

/// Document tree plus per-element storage, held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    file_name: String,
    page_name: String,
    roots: Vec<ElementId>,
    entries: IndexMap<ElementId, Entry>,
    selection: Vec<ElementId>,
}

impl MemoryDocument {
    pub fn new(file_name: impl Into<String>, page_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            page_name: page_name.into(),
            ..Self::default()
        }
    }

    /// Append `element` as the last child of `parent`, or as the last root.
    pub fn insert(
        &mut self,
        parent: Option<&ElementId>,
        element: ElementRef,
    ) -> Result<(), HostError> {
        let id = element.id.clone();
        if self.entries.contains_key(&id) {
            return Err(HostError::DuplicateElement(id.to_string()));
        }

        match parent {
            Some(parent_id) => {
                let parent_entry = self
                    .entries
                    .get_mut(parent_id)
                    .ok_or_else(|| HostError::ElementNotFound(parent_id.to_string()))?;
                parent_entry.children.push(id.clone());
            }
            None => self.roots.push(id.clone()),
        }

        self.entries.insert(
            id,
            Entry {
                element,
                parent: parent.cloned(),
                children: Vec::new(),
                data: IndexMap::new(),
            },
        );
        Ok(())
    }

    /// Delete an element and its whole subtree, plugin data included.
    pub fn remove_element(&mut self, id: &ElementId) -> Result<(), HostError> {
        let parent = self
            .entries
            .get(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))?
            .parent
            .clone();

        match parent.and_then(|p| self.entries.get_mut(&p)) {
            Some(parent_entry) => parent_entry.children.retain(|c| c != id),
            None => self.roots.retain(|r| r != id),
        }

        let mut doomed = self.descendants(id);
        doomed.push(id.clone());
        for gone in &doomed {
            self.entries.shift_remove(gone);
        }
        self.selection.retain(|s| !doomed.contains(s));
        Ok(())
    }

    pub fn set_selection(&mut self, ids: Vec<ElementId>) {
        self.selection = ids;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self, HostError> {
        let mut doc = Self::new(snapshot.file_name, snapshot.page_name);
        for element in snapshot.elements {
            doc.insert_snapshot(None, element)?;
        }
        doc.selection = snapshot
            .selection
            .into_iter()
            .filter(|id| doc.entries.contains_key(id))
            .collect();
        Ok(doc)
    }

    fn insert_snapshot(
        &mut self,
        parent: Option<&ElementId>,
        snapshot: SnapshotElement,
    ) -> Result<(), HostError> {
        let id = snapshot.element.id.clone();
        self.insert(parent, snapshot.element)?;
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.data = snapshot.plugin_data;
        }
        for child in snapshot.children {
            self.insert_snapshot(Some(&id), child)?;
        }
        Ok(())
    }

    pub fn to_snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            file_name: self.file_name.clone(),
            page_name: self.page_name.clone(),
            selection: self.selection.clone(),
            elements: self.roots.iter().filter_map(|id| self.snapshot_of(id)).collect(),
        }
    }

    fn snapshot_of(&self, id: &ElementId) -> Option<SnapshotElement> {
        let entry = self.entries.get(id)?;
        Some(SnapshotElement {
            element: entry.element.clone(),
            plugin_data: entry
                .data
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            children: entry
                .children
                .iter()
                .filter_map(|c| self.snapshot_of(c))
                .collect(),
        })
    }
}

impl DocumentTree for MemoryDocument {
    fn element(&self, id: &ElementId) -> Option<ElementRef> {
        self.entries.get(id).map(|e| e.element.clone())
    }

    fn roots(&self) -> Vec<ElementId> {
        self.roots.clone()
    }

    fn children(&self, id: &ElementId) -> Vec<ElementId> {
        self.entries
            .get(id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, id: &ElementId) -> Option<ElementId> {
        self.entries.get(id).and_then(|e| e.parent.clone())
    }

    fn selection(&self) -> Vec<ElementId> {
        self.selection.clone()
    }

    fn file_name(&self) -> String {
        self.file_name.clone()
    }

    fn page_name(&self) -> String {
        self.page_name.clone()
    }
}

impl ElementStorage for MemoryDocument {
    fn get_data(&self, id: &ElementId, key: &str) -> Result<Option<String>, HostError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))?;
        Ok(entry.data.get(key).filter(|v| !v.is_empty()).cloned())
    }

    fn set_data(&mut self, id: &ElementId, key: &str, value: &str) -> Result<(), HostError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))?;
        entry.data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
