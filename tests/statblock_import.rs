//! End-to-end creature import: parse a statblock, then materialize it
//! against an in-memory library.

mod common;

use std::sync::Arc;

use common::{MemoryLibrary, MemoryStore};
use statblock_import::ingestion::materialize::{ContentCategory, DraftKind, Materializer};
use statblock_import::ingestion::segmenter::LineHint;
use statblock_import::ingestion::statblock::record::SpellcastingKind;
use statblock_import::ingestion::statblock::CreatureBlockId;
use statblock_import::{Error, ImporterConfig, StatBlockParser};

const ACOLYTE: &str = "Acolyte
Medium humanoid (any race), any alignment
Armor Class 10
Hit Points 9 (2d8)
Speed 30 ft.
STR DEX CON INT WIS CHA
10 (+0) 10 (+0) 10 (+0) 10 (+0) 14 (+2) 11 (+0)
Skills Medicine +4, Religion +2
Senses passive Perception 12
Languages any one language (usually Common)
Challenge 1/4 (50 XP)
Spellcasting. The acolyte is a 1st-level spellcaster. Its spellcasting ability is Wisdom (spell save DC 12, +4 to hit with spell attacks). The acolyte has following cleric spells prepared:
Cantrips (at will): light, sacred flame, thaumaturgy
1st level (3 slots): bless, cure wounds, sanctuary
Actions
Club. Melee Weapon Attack: +2 to hit, reach 5 ft., one target. Hit: 2 (1d4) bludgeoning damage.";

const GUARD: &str = "Guard
Medium humanoid (any race), any alignment
Armor Class 16 (chain shirt, shield)
Hit Points 11 (2d8 + 2)
Speed 30 ft.
STR DEX CON INT WIS CHA
13 (+1) 12 (+1) 12 (+1) 10 (+0) 11 (+0) 10 (+0)
Challenge 1/8 (25 XP)
Actions
Spear. Melee or Ranged Weapon Attack: +3 to hit, reach 5 ft. or range 20/60 ft., one target. Hit: 4 (1d6 + 1) piercing damage.";

fn parser() -> StatBlockParser {
    StatBlockParser::new(&ImporterConfig::default())
}

#[test]
fn test_acolyte_spellcasting() {
    let parsed = parser().parse(ACOLYTE, &[]).expect("acolyte parses");
    let acolyte = &parsed.creature;

    assert_eq!(acolyte.name, "Acolyte");
    assert_eq!(acolyte.health.as_ref().map(|h| h.value), Some(9));

    let spellcasting = acolyte.spellcasting.as_ref().expect("prepared spellcasting");
    assert_eq!(spellcasting.kind, SpellcastingKind::Prepared);
    assert_eq!(spellcasting.save_dc, Some(12));
    let names: Vec<&str> = spellcasting.spell_names().collect();
    assert_eq!(
        names,
        vec!["Light", "Sacred Flame", "Thaumaturgy", "Bless", "Cure Wounds", "Sanctuary"]
    );

    assert_eq!(acolyte.actions.len(), 1);
    assert_eq!(acolyte.actions[0].title, "Club");
}

#[test]
fn test_hint_reclassifies_line() {
    let hints = [LineHint::new(
        "Languages any one language (usually Common)",
        CreatureBlockId::Senses,
    )];
    let parsed = parser().parse(ACOLYTE, &hints).expect("acolyte parses");

    assert!(parsed.blocks.get(CreatureBlockId::Languages).is_none());
    let senses = parsed.blocks.get(CreatureBlockId::Senses).expect("senses block");
    assert!(senses.lines.iter().any(|l| l.hinted));
}

#[tokio::test]
async fn test_materialize_records_missing_spells() {
    let library = MemoryLibrary::default()
        .with("Light", ContentCategory::Spell)
        .with("Sacred Flame", ContentCategory::Spell)
        .with("Bless", ContentCategory::Spell)
        .with("Cure Wounds", ContentCategory::Spell);
    let store = Arc::new(MemoryStore::default());
    let materializer = Materializer::new(Arc::new(library), store.clone());

    let mut parsed = parser().parse(ACOLYTE, &[]).expect("acolyte parses");
    let stored = materializer
        .materialize_creature(&mut parsed.creature)
        .await
        .expect("store accepts");

    assert_eq!(stored.name, "Acolyte");
    assert_eq!(
        parsed.creature.import_issues.missing_spells,
        vec!["Thaumaturgy", "Sanctuary"]
    );

    let drafts = store.drafts.lock().unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].kind, DraftKind::Creature);
    let spells = drafts[0]
        .items
        .iter()
        .filter(|i| i.category == ContentCategory::Spell)
        .count();
    assert_eq!(spells, 4);
    assert_eq!(drafts[0].data["name"], "Acolyte");
}

#[tokio::test]
async fn test_materialize_armor_with_suffix() {
    let library = MemoryLibrary::default()
        .with("Chain Shirt Armor", ContentCategory::Equipment);
    let store = Arc::new(MemoryStore::default());
    let materializer = Materializer::new(Arc::new(library), store.clone());

    let mut parsed = parser().parse(GUARD, &[]).expect("guard parses");
    materializer
        .materialize_creature(&mut parsed.creature)
        .await
        .expect("store accepts");

    assert_eq!(parsed.creature.import_issues.missing_items, vec!["shield"]);
    let drafts = store.drafts.lock().unwrap();
    assert!(drafts[0]
        .items
        .iter()
        .any(|i| i.library.as_ref().is_some_and(|l| l.name == "Chain Shirt Armor")));
}

#[tokio::test]
async fn test_store_failure_is_returned() {
    let store = Arc::new(MemoryStore {
        read_only: true,
        ..MemoryStore::default()
    });
    let materializer = Materializer::new(Arc::new(MemoryLibrary::default()), store);

    let mut parsed = parser().parse(GUARD, &[]).expect("guard parses");
    let err = materializer
        .materialize_creature(&mut parsed.creature)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
}
