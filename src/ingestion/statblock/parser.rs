//! Statblock parser.
//!
//! Ties segmentation and extraction together: segment the text, run the
//! header extractors, then assemble the action blocks. Header fields go first
//! so ability inference in actions can see the scores.
//!
//! # Example
//!
//! ```ignore
//! use crate::config::ImporterConfig;
//! use crate::ingestion::statblock::StatBlockParser;
//!
//! let parser = StatBlockParser::new(&ImporterConfig::default());
//! let parsed = parser.parse("Goblin\nArmor Class 15 (leather armor, shield)", &[]).unwrap();
//! assert_eq!(parsed.creature.armor.unwrap().ac, 15);
//! ```

use regex::Regex;
use serde::Serialize;

use super::actions::{set_action_block, set_action_counts};
use super::extractors::*;
use super::patterns::{CreatureBlockId, CreatureRegistry};
use super::record::CreatureRecord;
use crate::config::{ImporterConfig, ParserConfig};
use crate::ingestion::segmenter::{segment, Block, LineHint, Segmentation};

/// Creature record plus the block map it was extracted from.
#[derive(Debug, Clone, Serialize)]
pub struct StatBlockParse {
    pub creature: CreatureRecord,
    pub blocks: Segmentation<CreatureBlockId>,
}

/// Parses creature statblocks. Holds no per-parse state.
pub struct StatBlockParser {
    config: ParserConfig,
    languages: Regex,
}

impl StatBlockParser {
    pub fn new(config: &ImporterConfig) -> Self {
        Self {
            config: config.parser.clone(),
            languages: language_regex(&config.vocabulary.extra_languages),
        }
    }

    /// Parse one statblock. Returns `None` for empty or whitespace-only input.
    pub fn parse(
        &self,
        text: &str,
        hints: &[LineHint<CreatureBlockId>],
    ) -> Option<StatBlockParse> {
        let mut blocks = segment(&CreatureRegistry, text, hints)?;

        let name = blocks
            .get(CreatureBlockId::Name)
            .and_then(|block| block.lines.first())
            .map(|line| line.text.clone())
            .unwrap_or_default();
        let mut creature = CreatureRecord::new(name);

        for block in blocks.blocks.values_mut() {
            if !block.id.is_action_block() {
                self.extract_field(block, &mut creature);
            }
        }

        for block in blocks.blocks.values() {
            if block.id.is_action_block() {
                set_action_block(block, &mut creature, &self.config);
            }
        }

        let has_legendary = blocks.blocks.contains_key(&CreatureBlockId::LegendaryActions);
        set_action_counts(&mut creature, has_legendary);

        log::info!(
            "Parsed '{}': {} blocks, {} unaccounted lines",
            creature.name,
            blocks.blocks.len(),
            blocks.unaccounted.len()
        );

        Some(StatBlockParse { creature, blocks })
    }

    fn extract_field(&self, block: &mut Block<CreatureBlockId>, creature: &mut CreatureRecord) {
        use CreatureBlockId::*;

        match block.id {
            Name => {}
            Armor => set_armor(block, creature),
            Health => creature.health = parse_roll(block),
            Souls => creature.souls = parse_roll(block),
            Abilities => set_abilities(block, creature),
            Challenge => set_challenge(block, creature),
            ConditionImmunities | DamageImmunities | Immunities | DamageResistances
            | DamageVulnerabilities => set_damages_and_conditions(block, creature),
            Languages => set_languages(block, creature, &self.languages),
            ProficiencyBonus => set_proficiency_bonus(block, creature),
            RacialDetails => set_racial_details(block, creature),
            SavingThrows => set_saving_throws(block, creature),
            Senses => set_senses(block, creature),
            Skills => set_skills(block, creature),
            Speed => set_speed(block, creature),
            other => log::debug!("No field extractor for block {other}"),
        }
    }
}

impl Default for StatBlockParser {
    fn default() -> Self {
        Self::new(&ImporterConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
