//! Record Materialization
//!
//! The post-parse phase: resolve a parsed record's named items against a
//! content library and hand the result to a record store. Field groups are
//! processed one at a time, in order. Lookup misses are recorded on the
//! record's import issues and never abort the run; store failures do.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crate::ingestion::materialize::Materializer;
//!
//! let materializer = Materializer::new(Arc::new(library), Arc::new(store));
//! let stored = materializer.materialize_creature(&mut parsed.creature).await?;
//! if !parsed.creature.import_issues.is_empty() {
//!     log::warn!("Missing spells: {:?}", parsed.creature.import_issues.missing_spells);
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::class::ClassRecord;
use super::statblock::record::{CreatureRecord, Feature, ImportIssues};
use crate::error::Result;

// ============================================================================
// Collaborator contracts
// ============================================================================

/// Kind of library content a name is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Spell,
    Equipment,
    Feature,
}

/// An existing entry in the content library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    pub category: ContentCategory,
    pub image: Option<String>,
}

/// Resolves a normalized name to zero or one library item.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentLookup: Send + Sync {
    async fn find(&self, name: &str, category: ContentCategory) -> Option<LibraryItem>;
}

/// Persists a finished draft.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, draft: RecordDraft) -> Result<StoredRecord>;
}

// ============================================================================
// Drafts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    Creature,
    Class,
}

/// One embedded item of a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftItem {
    pub name: String,
    pub category: ContentCategory,
    /// Library entry the item was resolved to; `None` for parsed-only items
    pub library: Option<LibraryItem>,
    pub description: Option<String>,
}

impl DraftItem {
    fn parsed(feature: &Feature) -> Self {
        Self {
            name: feature.title.clone(),
            category: ContentCategory::Feature,
            library: None,
            description: Some(feature.description.clone()),
        }
    }

    fn resolved(item: LibraryItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category,
            library: Some(item),
            description: None,
        }
    }
}

/// What the store receives: the record as JSON plus its resolved items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub kind: DraftKind,
    pub name: String,
    pub items: Vec<DraftItem>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Materializer
// ============================================================================

pub struct Materializer {
    lookup: Arc<dyn ContentLookup>,
    store: Arc<dyn RecordStore>,
}

impl Materializer {
    pub fn new(lookup: Arc<dyn ContentLookup>, store: Arc<dyn RecordStore>) -> Self {
        Self { lookup, store }
    }

    /// Resolve and store a creature. Misses land in `record.import_issues`.
    pub async fn materialize_creature(&self, record: &mut CreatureRecord) -> Result<StoredRecord> {
        let mut items = Vec::new();

        let feature_groups = [
            &record.features,
            &record.actions,
            &record.bonus_actions,
            &record.reactions,
            &record.legendary_actions,
            &record.lair_actions,
            &record.mythic_actions,
            &record.villain_actions,
        ];
        for group in feature_groups {
            for feature in group {
                items.push(self.feature_item(feature).await);
            }
        }

        let mut issues = ImportIssues::default();

        if let Some(armor) = &record.armor {
            for armor_type in &armor.types {
                if armor_type.eq_ignore_ascii_case("natural armor") {
                    continue;
                }
                match self.find_armor(armor_type).await {
                    Some(item) => items.push(DraftItem::resolved(item)),
                    None => record_miss(&mut issues.missing_items, armor_type, "equipment"),
                }
            }
        }

        let spell_names: Vec<String> = record
            .spellcasting_records()
            .flat_map(|sc| sc.spell_names().map(str::to_string))
            .collect();
        self.resolve_spells(&spell_names, &mut items, &mut issues).await;

        merge_issues(&mut record.import_issues, issues);

        let draft = RecordDraft {
            kind: DraftKind::Creature,
            name: record.name.clone(),
            items,
            data: serde_json::to_value(&*record)?,
        };
        self.store_draft(draft, &record.import_issues).await
    }

    /// Resolve and store a class. Misses land in `record.import_issues`.
    pub async fn materialize_class(&self, record: &mut ClassRecord) -> Result<StoredRecord> {
        let mut items = Vec::new();

        for feature in record.class_features.iter().chain(&record.subclass_features) {
            let library = self
                .lookup
                .find(&feature.name.to_lowercase(), ContentCategory::Feature)
                .await;
            items.push(DraftItem {
                name: feature.name.clone(),
                category: ContentCategory::Feature,
                library,
                description: Some(feature.description.clone()),
            });
        }

        let mut issues = ImportIssues::default();
        let spell_names: Vec<String> = record.spell_names().map(str::to_string).collect();
        self.resolve_spells(&spell_names, &mut items, &mut issues).await;

        merge_issues(&mut record.import_issues, issues);

        let draft = RecordDraft {
            kind: DraftKind::Class,
            name: record.name.clone(),
            items,
            data: serde_json::to_value(&*record)?,
        };
        self.store_draft(draft, &record.import_issues).await
    }

    async fn feature_item(&self, feature: &Feature) -> DraftItem {
        let mut item = DraftItem::parsed(feature);
        item.library = self
            .lookup
            .find(&feature.title.to_lowercase(), ContentCategory::Feature)
            .await;
        item
    }

    /// Armor types are tried as written, then with " armor" appended.
    async fn find_armor(&self, armor_type: &str) -> Option<LibraryItem> {
        if let Some(item) = self.lookup.find(armor_type, ContentCategory::Equipment).await {
            return Some(item);
        }
        self.lookup
            .find(&format!("{armor_type} armor"), ContentCategory::Equipment)
            .await
    }

    async fn resolve_spells(
        &self,
        names: &[String],
        items: &mut Vec<DraftItem>,
        issues: &mut ImportIssues,
    ) {
        for name in names {
            let name = name.trim();
            match self.lookup.find(name, ContentCategory::Spell).await {
                Some(item) => items.push(DraftItem::resolved(item)),
                None => record_miss(&mut issues.missing_spells, name, "spell"),
            }
        }
    }

    async fn store_draft(&self, draft: RecordDraft, issues: &ImportIssues) -> Result<StoredRecord> {
        let name = draft.name.clone();
        let item_count = draft.items.len();
        let stored = self.store.create(draft).await?;

        if issues.is_empty() {
            log::info!("Stored '{name}' with {item_count} items");
        } else {
            log::warn!(
                "Stored '{name}' with {item_count} items; missing spells: [{}], missing items: [{}]",
                issues.missing_spells.join(", "),
                issues.missing_items.join(", ")
            );
        }
        Ok(stored)
    }
}

fn record_miss(list: &mut Vec<String>, name: &str, category: &str) {
    log::warn!("No {category} named '{name}' in the content library");
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

fn merge_issues(target: &mut ImportIssues, found: ImportIssues) {
    for name in found.missing_spells {
        if !target.missing_spells.contains(&name) {
            target.missing_spells.push(name);
        }
    }
    for name in found.missing_items {
        if !target.missing_items.contains(&name) {
            target.missing_items.push(name);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
