//! Class Pattern Registry
//!
//! Class writeups label every section with a header phrase, usually followed
//! by a colon. Blocks are reopened whenever their header repeats.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ingestion::segmenter::BlockRegistry;

/// Semantic sections of a class writeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassBlockId {
    Name,
    Level,
    HitDie,
    HitPoints,
    ProficiencyBonus,
    ArmorProficiencies,
    WeaponProficiencies,
    ToolProficiencies,
    SavingThrows,
    Skills,
    Equipment,
    ClassFeatures,
    Subclass,
    SubclassFeatures,
    Spellcasting,
    SpellSlots,
    Cantrips,
    Spells,
    Multiclassing,
    /// Free description; reachable only through a hint
    OtherBlock,
}

impl ClassBlockId {
    pub const ALL: [ClassBlockId; 20] = [
        Self::Name,
        Self::Level,
        Self::HitDie,
        Self::HitPoints,
        Self::ProficiencyBonus,
        Self::ArmorProficiencies,
        Self::WeaponProficiencies,
        Self::ToolProficiencies,
        Self::SavingThrows,
        Self::Skills,
        Self::Equipment,
        Self::ClassFeatures,
        Self::Subclass,
        Self::SubclassFeatures,
        Self::Spellcasting,
        Self::SpellSlots,
        Self::Cantrips,
        Self::Spells,
        Self::Multiclassing,
        Self::OtherBlock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Level => "level",
            Self::HitDie => "hitDie",
            Self::HitPoints => "hitPoints",
            Self::ProficiencyBonus => "proficiencyBonus",
            Self::ArmorProficiencies => "armorProficiencies",
            Self::WeaponProficiencies => "weaponProficiencies",
            Self::ToolProficiencies => "toolProficiencies",
            Self::SavingThrows => "savingThrows",
            Self::Skills => "skills",
            Self::Equipment => "equipment",
            Self::ClassFeatures => "classFeatures",
            Self::Subclass => "subclass",
            Self::SubclassFeatures => "subclassFeatures",
            Self::Spellcasting => "spellcasting",
            Self::SpellSlots => "spellSlots",
            Self::Cantrips => "cantrips",
            Self::Spells => "spells",
            Self::Multiclassing => "multiclassing",
            Self::OtherBlock => "otherBlock",
        }
    }

    /// The header pattern that opens this block, if it has one.
    pub fn header(&self) -> Option<&'static Regex> {
        CLASS_PATTERNS
            .iter()
            .find(|(_, id)| id == self)
            .map(|(regex, _)| regex)
    }
}

impl fmt::Display for ClassBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassBlockId {
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
// Header patterns
// ============================================================================

fn header(pattern: &str) -> Regex {
    Regex::new(&format!(r"(?i)^(?:{pattern})[:\s]")).expect("Failed to compile class header")
}

/// Ordered (header, block) entries. First match wins.
pub static CLASS_PATTERNS: Lazy<Vec<(Regex, ClassBlockId)>> = Lazy::new(|| {
    use ClassBlockId::*;
    vec![
        (header(r"level|class level|lvl"), Level),
        (header(r"hit die|hit dice|hd"), HitDie),
        (header(r"hit points|hp|health"), HitPoints),
        (header(r"proficiency bonus|prof bonus|pb"), ProficiencyBonus),
        (header(r"armor proficienc(?:y|ies)"), ArmorProficiencies),
        (header(r"weapon proficienc(?:y|ies)"), WeaponProficiencies),
        (header(r"tool proficienc(?:y|ies)"), ToolProficiencies),
        (header(r"saving throws?(?: proficienc(?:y|ies))?"), SavingThrows),
        (header(r"skills?(?: proficienc(?:y|ies))?"), Skills),
        (header(r"equipment|starting equipment"), Equipment),
        (header(r"class features?|features?"), ClassFeatures),
        (header(r"subclass|archetype|path|tradition|patron|domain|circle"), Subclass),
        (header(r"subclass features?|archetype features?"), SubclassFeatures),
        (header(r"spellcasting|magic"), Spellcasting),
        (header(r"spell slots?"), SpellSlots),
        (header(r"cantrips?(?: known)?"), Cantrips),
        (header(r"spells?(?: known)?|prepared spells?"), Spells),
        (header(r"multiclassing"), Multiclassing),
    ]
});

/// A subclass heading would otherwise claim "Subclass Features:" lines.
static SUBCLASS_FEATURES_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:subclass|archetype) features?\b").expect("Failed to compile subclass features line")
});

/// First block whose header matches `line`.
pub fn classify(line: &str) -> Option<ClassBlockId> {
    let line = line.trim();
    CLASS_PATTERNS
        .iter()
        .filter(|(_, id)| *id != ClassBlockId::Subclass || !SUBCLASS_FEATURES_LINE.is_match(line))
        .find(|(regex, _)| regex.is_match(line))
        .map(|(_, id)| *id)
}

/// Segmentation rules for class writeups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassRegistry;

impl BlockRegistry for ClassRegistry {
    type Id = ClassBlockId;

    fn name_block(&self) -> ClassBlockId {
        ClassBlockId::Name
    }

    fn classify(&self, line: &str, _excluded: &[ClassBlockId]) -> Option<ClassBlockId> {
        classify(line)
    }

    fn excludes_opened(&self) -> bool {
        false
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

field_pattern!(LEVEL_DETAILS, r"(?i)(?:level|lvl)[:\s]*(?P<level>\d+)");
field_pattern!(HIT_DIE_DETAILS, r"(?i)\b(?P<count>\d*)d(?P<sides>\d+)\b");
field_pattern!(HIT_POINTS_DETAILS, r"(?P<value>\d+)\s*(?:\+\s*(?P<formula>.+))?");
field_pattern!(PROFICIENCY_BONUS_DETAILS, r"\+?(?P<bonus>\d+)");
field_pattern!(
    FEATURE_TITLE,
    r"(?i)^(?P<name>[^(]+?)(?:\s*\((?:level\s*)?(?P<level>\d+)\))?$"
);
field_pattern!(
    ABILITY_TOKENS,
    r"(?i)\b(?:strength|dexterity|constitution|intelligence|wisdom|charisma|str|dex|con|int|wis|cha)\b"
);
field_pattern!(
    SKILL_TOKENS,
    r"(?i)\b(?:acrobatics|animal handling|arcana|athletics|deception|history|insight|intimidation|investigation|medicine|nature|perception|performance|persuasion|religion|sleight of hand|stealth|survival)\b"
);
field_pattern!(
    SPELLCASTING_ABILITY,
    r"(?i)(?:spellcasting ability|spell save dc|spell attack)[^.]*?\b(?P<ability>strength|dexterity|constitution|intelligence|wisdom|charisma|str|dex|con|int|wis|cha)\b"
);
field_pattern!(SPELL_LEVEL, r"(?i)(?P<level>\d+)(?:st|nd|rd|th)\s*level");
field_pattern!(CANTRIP, r"(?i)cantrip");
field_pattern!(LIST_SEPARATORS, r"[,;•]");

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_classification() {
        let cases = [
            ("Level: 3", Some(ClassBlockId::Level)),
            ("Hit Die: d10", Some(ClassBlockId::HitDie)),
            ("Hit Points: 10 + your Constitution modifier", Some(ClassBlockId::HitPoints)),
            ("Armor Proficiencies: Light armor", Some(ClassBlockId::ArmorProficiencies)),
            ("Saving Throws: Strength, Constitution", Some(ClassBlockId::SavingThrows)),
            ("Skill Proficiencies: Athletics", Some(ClassBlockId::Skills)),
            ("Starting Equipment:", Some(ClassBlockId::Equipment)),
            ("Class Features:", Some(ClassBlockId::ClassFeatures)),
            ("Path of the Berserker", Some(ClassBlockId::Subclass)),
            ("Subclass Features:", Some(ClassBlockId::SubclassFeatures)),
            ("Spell Slots: 2 first-level", Some(ClassBlockId::SpellSlots)),
            ("Cantrips Known: fire bolt", Some(ClassBlockId::Cantrips)),
            ("Spells Known:", Some(ClassBlockId::Spells)),
            ("Spellcasting: Intelligence", Some(ClassBlockId::Spellcasting)),
            ("Multiclassing: Strength 13", Some(ClassBlockId::Multiclassing)),
            ("Rage (Level 1)", None),
        ];

        for (line, expected) in cases {
            assert_eq!(classify(line), expected, "line: {line}");
        }
    }

    #[test]
    fn test_header_needs_separator() {
        assert_eq!(classify("Levels of madness"), None);
        assert_eq!(classify("Pathfinder"), None);
    }

    #[test]
    fn test_block_ids_parse() {
        assert_eq!("otherBlock".parse::<ClassBlockId>().unwrap(), ClassBlockId::OtherBlock);
        assert_eq!("HITDIE".parse::<ClassBlockId>().unwrap(), ClassBlockId::HitDie);
        assert!("tail".parse::<ClassBlockId>().is_err());
    }

    #[test]
    fn test_other_block_has_no_header() {
        assert!(ClassBlockId::OtherBlock.header().is_none());
        assert!(ClassBlockId::Spells.header().is_some());
    }
}
