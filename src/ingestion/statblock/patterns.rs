//! Creature Pattern Registry
//!
//! Block ids, the ordered line patterns that open each block, and the
//! field-level patterns the extractors apply inside a block.
//!
//! Line pattern order is a contract: several patterns overlap (a generic
//! `resistances` line also reads as one of the combined immunity forms), and
//! the first pattern in [`LINE_PATTERNS`] order wins.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ingestion::assembler::is_title;
use crate::ingestion::segmenter::BlockRegistry;

// ============================================================================
// Block ids
// ============================================================================

/// Semantic sections of a creature statblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreatureBlockId {
    /// First content line
    Name,
    /// Unlabeled features that follow the header region
    Features,
    Armor,
    Actions,
    Abilities,
    BonusActions,
    Challenge,
    ConditionImmunities,
    DamageImmunities,
    /// Combined damage and condition immunities line
    Immunities,
    DamageResistances,
    DamageVulnerabilities,
    Health,
    LairActions,
    Languages,
    LegendaryActions,
    MythicActions,
    ProficiencyBonus,
    RacialDetails,
    Reactions,
    SavingThrows,
    Senses,
    Skills,
    Speed,
    Souls,
    Traits,
    UtilitySpells,
    VillainActions,
}

impl CreatureBlockId {
    pub const ALL: [CreatureBlockId; 28] = [
        Self::Name,
        Self::Features,
        Self::Armor,
        Self::Actions,
        Self::Abilities,
        Self::BonusActions,
        Self::Challenge,
        Self::ConditionImmunities,
        Self::DamageImmunities,
        Self::Immunities,
        Self::DamageResistances,
        Self::DamageVulnerabilities,
        Self::Health,
        Self::LairActions,
        Self::Languages,
        Self::LegendaryActions,
        Self::MythicActions,
        Self::ProficiencyBonus,
        Self::RacialDetails,
        Self::Reactions,
        Self::SavingThrows,
        Self::Senses,
        Self::Skills,
        Self::Speed,
        Self::Souls,
        Self::Traits,
        Self::UtilitySpells,
        Self::VillainActions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Features => "features",
            Self::Armor => "armor",
            Self::Actions => "actions",
            Self::Abilities => "abilities",
            Self::BonusActions => "bonusActions",
            Self::Challenge => "challenge",
            Self::ConditionImmunities => "conditionImmunities",
            Self::DamageImmunities => "damageImmunities",
            Self::Immunities => "immunities",
            Self::DamageResistances => "damageResistances",
            Self::DamageVulnerabilities => "damageVulnerabilities",
            Self::Health => "health",
            Self::LairActions => "lairActions",
            Self::Languages => "languages",
            Self::LegendaryActions => "legendaryActions",
            Self::MythicActions => "mythicActions",
            Self::ProficiencyBonus => "proficiencyBonus",
            Self::RacialDetails => "racialDetails",
            Self::Reactions => "reactions",
            Self::SavingThrows => "savingThrows",
            Self::Senses => "senses",
            Self::Skills => "skills",
            Self::Speed => "speed",
            Self::Souls => "souls",
            Self::Traits => "traits",
            Self::UtilitySpells => "utilitySpells",
            Self::VillainActions => "villainActions",
        }
    }

    /// Blocks holding single-line labeled facts above the feature prose.
    pub fn is_header_block(&self) -> bool {
        matches!(
            self,
            Self::Armor
                | Self::Abilities
                | Self::Challenge
                | Self::ConditionImmunities
                | Self::DamageImmunities
                | Self::Immunities
                | Self::DamageResistances
                | Self::DamageVulnerabilities
                | Self::Health
                | Self::Languages
                | Self::ProficiencyBonus
                | Self::RacialDetails
                | Self::SavingThrows
                | Self::Senses
                | Self::Skills
                | Self::Souls
                | Self::Speed
        )
    }

    /// Blocks whose content is titled feature prose.
    pub fn is_action_block(&self) -> bool {
        matches!(
            self,
            Self::Features
                | Self::Traits
                | Self::Actions
                | Self::BonusActions
                | Self::Reactions
                | Self::LegendaryActions
                | Self::LairActions
                | Self::MythicActions
                | Self::UtilitySpells
                | Self::VillainActions
        )
    }
}

impl fmt::Display for CreatureBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreatureBlockId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| Error::UnknownBlock(wanted.to_string()))
    }
}

// ============================================================================
// Line patterns
// ============================================================================

fn line_pattern(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("Failed to compile line pattern")
}

/// Ordered (pattern, block) entries. First match wins.
pub static LINE_PATTERNS: Lazy<Vec<(Regex, CreatureBlockId)>> = Lazy::new(|| {
    use CreatureBlockId::*;
    vec![
        (line_pattern(r"^((armor|armour) class|ac)\s\d+"), Armor),
        (line_pattern(r"^actions$"), Actions),
        (
            line_pattern(r"^(\bstr\b|\bdex\b|\bcon\b|\bint\b|\bwis\b|\bcha\b|\bmod\s+save\b)"),
            Abilities,
        ),
        (line_pattern(r"^bonus actions$"), BonusActions),
        (line_pattern(r"^(challenge|\bcr\b|challenge rating)\s(\d|½)"), Challenge),
        (line_pattern(r"^condition immunities\s"), ConditionImmunities),
        (line_pattern(r"^damage immunities\s"), DamageImmunities),
        (line_pattern(r"^immunities\s"), Immunities),
        (line_pattern(r"^damage resistances\s|^resistances\s"), DamageResistances),
        (line_pattern(r"^damage vulnerabilities\s|^vulnerabilities\s"), DamageVulnerabilities),
        (line_pattern(r"^(hit points|\bhp\b)\s\d+"), Health),
        (line_pattern(r"^lair actions$"), LairActions),
        (line_pattern(r"^languages\s"), Languages),
        (line_pattern(r"^legendary actions$"), LegendaryActions),
        (line_pattern(r"^mythic actions$"), MythicActions),
        (line_pattern(r"^proficiency bonus\s\+"), ProficiencyBonus),
        (
            line_pattern(
                r"^\b(fine|diminutive|tiny|small|medium|large|huge|gargantuan|colossal)\b(\sswarm of \w+)?\s\w+",
            ),
            RacialDetails,
        ),
        (line_pattern(r"^reactions$"), Reactions),
        (
            line_pattern(
                r"^(saving throws|saves)\s(\bstr\b|\bdex\b|\bcon\b|\bint\b|\bwis\b|\bcha\b)",
            ),
            SavingThrows,
        ),
        (line_pattern(r"^senses( passive)?(.+\d+\s\bft\b)?"), Senses),
        (line_pattern(r"^skills.+[+\-−]\d+"), Skills),
        (line_pattern(r"^speed\s\d+\s?ft"), Speed),
        (line_pattern(r"^souls\s\d+"), Souls),
        (line_pattern(r"^traits$"), Traits),
        (line_pattern(r"^utility spells$"), UtilitySpells),
        (line_pattern(r"^villain actions$"), VillainActions),
    ]
});

/// First block whose line pattern matches, skipping excluded ids.
pub fn classify(line: &str, excluded: &[CreatureBlockId]) -> Option<CreatureBlockId> {
    LINE_PATTERNS
        .iter()
        .find(|(regex, id)| !excluded.contains(id) && regex.is_match(line))
        .map(|(_, id)| *id)
}

/// Segmentation rules for creature statblocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatureRegistry;

impl BlockRegistry for CreatureRegistry {
    type Id = CreatureBlockId;

    fn name_block(&self) -> CreatureBlockId {
        CreatureBlockId::Name
    }

    fn classify(&self, line: &str, excluded: &[CreatureBlockId]) -> Option<CreatureBlockId> {
        classify(line, excluded)
    }

    fn is_header_block(&self, id: CreatureBlockId) -> bool {
        id.is_header_block()
    }

    fn header_fallback(&self, line: &str) -> Option<CreatureBlockId> {
        is_title(line).then_some(CreatureBlockId::Features)
    }

    fn one_shot(&self) -> Option<CreatureBlockId> {
        Some(CreatureBlockId::Abilities)
    }
}

// ============================================================================
// Field patterns
// ============================================================================

macro_rules! field_pattern {
    ($name:ident, $pattern:expr) => {
        pub static $name: Lazy<Regex> = Lazy::new(|| {
            Regex::new($pattern).expect(concat!("Failed to compile ", stringify!($name)))
        });
    };
}

field_pattern!(ARMOR_DETAILS, r"(?P<ac>\d+)(?: \((?P<types>.+)\))?");
field_pattern!(
    CHALLENGE_DETAILS,
    r"(?i)(?P<cr>½|[\d/]+)\s?(?:\((?P<xp>[\d,]+)\s?xp|\(xp (?P<xp24>[\d,]+))?"
);
field_pattern!(ROLE_DETAILS, r"(?i)\d+\s(?P<role>[a-z]+)");
field_pattern!(
    ROLL_DETAILS,
    r"(?P<value>\d+)\s?(?:\((?P<formula>\d+d\d+(?:\s?[+\-−–]\s?\d+)?)\))?"
);
field_pattern!(PROFICIENCY_DETAILS, r"\+\s?(?P<bonus>\d+)");
field_pattern!(
    RACIAL_DETAILS,
    r"(?i)^(?P<size>\b(?:fine|diminutive|tiny|small|medium|large|huge|gargantuan|colossal)\b)(?:\sswarm of (?P<swarm>\w+))?\s(?P<type>\w+)(?:[,\s]+\((?P<race>[,\w\s]+)\))?(?:[,\s]+(?P<alignment>[\w\s\-]+))?"
);
field_pattern!(ABILITY_NAMES, r"(?i)\b(?:str|dex|con|int|wis|cha)\b");
field_pattern!(
    ABILITY_VALUES,
    r"(?P<base>\d+)\s?\((?P<modifier>[+\-−–]?\d+)\)"
);
field_pattern!(
    ABILITY_VALUES_24,
    r"(?P<base>\d+)\s?(?P<modifier>[+\-−–]\d+)\s?(?P<save>[+\-−–]\d+)"
);
field_pattern!(SENSES_DETAILS, r"(?i)(?P<name>[a-z]+) (?P<range>\d+)");
field_pattern!(
    SKILL_DETAILS,
    r"(?i)(?P<name>acrobatics|animal handling|arcana|athletics|deception|history|insight|intimidation|investigation|medicine|nature|perception|performance|persuasion|religion|sleight of hand|stealth|survival) (?P<modifier>[+\-−–]\d+)"
);
field_pattern!(SPEED_DETAILS, r"(?i)(?P<name>[a-z]+)\s?(?P<value>\d+)");
field_pattern!(
    DAMAGE_CONDITION_HEADER,
    r"(?i)((damage|condition)\s)?(resistances|vulnerabilities|immunities)"
);
field_pattern!(
    DAMAGE_TYPES,
    r"(?i)\b(?:bludgeoning|piercing|slashing|acid|cold|fire|force|lightning|necrotic|poison|psychic|radiant|thunder)\b"
);
field_pattern!(
    CONDITION_TYPES,
    r"(?i)\b(?:blinded|charmed|deafened|diseased|exhaustion|frightened|grappled|incapacitated|invisible|paralyzed|petrified|poisoned|prone|restrained|stunned|unconscious)\b"
);
field_pattern!(RESIDUE_SEPARATORS, r"(?i)[,;]|\band\b|\bor\b");

// Actions

field_pattern!(
    SAVING_THROW_DETAILS,
    r"(?i)must (?:make|succeed on) a dc (?P<dc>\d+) (?P<ability>\w+) (?:saving throw|save)"
);
field_pattern!(
    SAVING_THROW_DETAILS_24,
    r"(?i)(?P<ability>\w+) saving throw:\s*dc (?P<dc>\d+)"
);
field_pattern!(ATTACK, r"(?i)\+(?P<to_hit>\d+) to hit");
field_pattern!(ATTACK_24, r"(?i)attack\sroll:\s*\+(?P<to_hit>\d+)");
field_pattern!(SPELL_ATTACK, r"(?i)spell attack");
field_pattern!(
    DAMAGE_ROLL,
    r"(?i)\(?(?P<roll1>\d+d\d+)\s?(?P<mod1>[+\-−–]\s?\d+)?\)? (?P<type1>\w+) damage(?:.+(?:plus|and)\s+(?:\d+\s+\(*)?(?P<roll2>\d+d\d+)\s?(?P<mod2>[+\-−–]\s?\d+)?\)? (?P<type2>\w+) damage)?"
);
field_pattern!(
    VERSATILE,
    r"(?i)\((?P<roll>\d+d\d+(?: ?\+ ?\d+)?)\) (?P<type>\w+) damage if used with two hands"
);
field_pattern!(ACTION_COST, r"(?i)\((?:costs )?(?P<cost>\d+) actions?\)");
field_pattern!(RECHARGE, r"(?i)\(recharge (?P<recharge>\d+)(?:[–\-]\d+)?\)");
field_pattern!(PER_DAY, r"(?i)(?P<per_day>\d+)/day");
field_pattern!(RANGE, r"(?i)range (?P<near>\d+)(?:/(?P<far>\d+))? ?(?:f(?:ee|oo)?t|'|’)");
field_pattern!(REACH, r"(?i)reach (?P<reach>\d+) ?(?:f(?:ee|oo)?t|'|’)");
field_pattern!(TARGET, r"(?i)(?P<size>\d+)?-(?:foot|ft?\.|'|’) (?P<shape>\w+)");
field_pattern!(LEGENDARY_ACTION_COUNT, r"(?i)take (?P<count>\d+) legendary");
field_pattern!(LAIR_INITIATIVE, r"(?i)initiative count (?P<count>\d+)");
field_pattern!(LEGENDARY_RESISTANCE, r"(?i)\((?P<per_day>\d+)/day\)");
field_pattern!(
    VILLAIN_ACTION_TITLE,
    r"^(?P<title>Action\s[123]:\s.+?[.!?])\s+(?P<description>.*)$"
);
field_pattern!(SPELLCASTING_TITLE, r"(?i)^(?:innate )?spellcasting(?: \(\w+\))?$");

// Spellcasting

field_pattern!(SPELL_INNATE_LINE, r"(?i)at will:|\d/day(?: each)?:");
field_pattern!(
    SPELL_LINE,
    r"(?i)(?:at-will|cantrips|1st|2nd|3rd|4th|5th|6th|7th|8th|9th)[\w\s()\-]*:"
);
field_pattern!(SPELL_INNATE_SINGLE, r"(?i)innately cast (?P<spell>[\w\s]+)(?:\s\(.+\))?,");
field_pattern!(SPELL_SLOTS, r"(?i)\((?P<slots>\d+) slot");
field_pattern!(SPELL_GROUP_LEVEL, r"(?i)(?P<level>[1-9])(?:st|nd|rd|th)");
field_pattern!(SPELL_ACTIVATION_SUFFIX, r"(?:\s[ABR]|\s?\+)$");
field_pattern!(
    SPELLCASTING_ABILITY,
    r"(?i)spellcasting ability is (?P<ability1>\w+)|(?P<ability2>\w+) as the spellcasting ability"
);
field_pattern!(SPELL_SAVE_DC, r"(?i)spell save dc (?P<dc>\d+)");
field_pattern!(
    SPELLCASTER_LEVEL,
    r"(?i)(?P<level>\d+)(?:st|nd|rd|th)?[\s\-]*level spellcaster"
);

// ============================================================================
// Tests
// ============================================================================
