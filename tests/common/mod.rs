//! In-memory collaborators for materialization tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use statblock_import::ingestion::materialize::{
    ContentCategory, ContentLookup, LibraryItem, RecordDraft, RecordStore, StoredRecord,
};
use statblock_import::{Error, Result};

/// Content library keyed by lowercase name.
#[derive(Default)]
pub struct MemoryLibrary {
    items: HashMap<(String, ContentCategory), LibraryItem>,
}

impl MemoryLibrary {
    pub fn with(mut self, name: &str, category: ContentCategory) -> Self {
        let item = LibraryItem {
            id: format!("item-{}", self.items.len() + 1),
            name: name.to_string(),
            category,
            image: None,
        };
        self.items.insert((name.to_lowercase(), category), item);
        self
    }
}

#[async_trait]
impl ContentLookup for MemoryLibrary {
    async fn find(&self, name: &str, category: ContentCategory) -> Option<LibraryItem> {
        self.items.get(&(name.to_lowercase(), category)).cloned()
    }
}

/// Record store that keeps every draft it accepts.
#[derive(Default)]
pub struct MemoryStore {
    pub drafts: Mutex<Vec<RecordDraft>>,
    pub read_only: bool,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, draft: RecordDraft) -> Result<StoredRecord> {
        if self.read_only {
            return Err(Error::store("store is read-only"));
        }
        let mut drafts = self.drafts.lock().map_err(|e| Error::store(e.to_string()))?;
        let stored = StoredRecord {
            id: format!("record-{}", drafts.len() + 1),
            name: draft.name.clone(),
        };
        drafts.push(draft);
        Ok(stored)
    }
}
