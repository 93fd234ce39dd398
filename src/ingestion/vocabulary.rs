//! Closed Vocabularies
//!
//! The fixed token sets the extractors recognize: ability and skill codes,
//! damage and condition types, languages, creature types, and encounter roles.
//! Anything outside these sets falls through to free-text fields.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Abilities
// ============================================================================

/// The six ability codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    /// All abilities, in statblock order.
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// Canonical lowercase code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Dex => "dex",
            Self::Con => "con",
            Self::Int => "int",
            Self::Wis => "wis",
            Self::Cha => "cha",
        }
    }

    /// Parse a short code or full ability name (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "str" | "strength" => Some(Self::Str),
            "dex" | "dexterity" => Some(Self::Dex),
            "con" | "constitution" => Some(Self::Con),
            "int" | "intelligence" => Some(Self::Int),
            "wis" | "wisdom" => Some(Self::Wis),
            "cha" | "charisma" => Some(Self::Cha),
            _ => None,
        }
    }

    /// Ability modifier for a score: floor((score - 10) / 2).
    pub fn modifier(score: i32) -> i32 {
        score.div_euclid(2) - 5
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Skills
// ============================================================================

/// The eighteen skill codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    #[serde(rename = "acr")]
    Acrobatics,
    #[serde(rename = "ani")]
    AnimalHandling,
    #[serde(rename = "arc")]
    Arcana,
    #[serde(rename = "ath")]
    Athletics,
    #[serde(rename = "dec")]
    Deception,
    #[serde(rename = "his")]
    History,
    #[serde(rename = "ins")]
    Insight,
    #[serde(rename = "itm")]
    Intimidation,
    #[serde(rename = "inv")]
    Investigation,
    #[serde(rename = "med")]
    Medicine,
    #[serde(rename = "nat")]
    Nature,
    #[serde(rename = "prc")]
    Perception,
    #[serde(rename = "prf")]
    Performance,
    #[serde(rename = "per")]
    Persuasion,
    #[serde(rename = "rel")]
    Religion,
    #[serde(rename = "slt")]
    SleightOfHand,
    #[serde(rename = "ste")]
    Stealth,
    #[serde(rename = "sur")]
    Survival,
}

impl Skill {
    /// Canonical three-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Acrobatics => "acr",
            Self::AnimalHandling => "ani",
            Self::Arcana => "arc",
            Self::Athletics => "ath",
            Self::Deception => "dec",
            Self::History => "his",
            Self::Insight => "ins",
            Self::Intimidation => "itm",
            Self::Investigation => "inv",
            Self::Medicine => "med",
            Self::Nature => "nat",
            Self::Perception => "prc",
            Self::Performance => "prf",
            Self::Persuasion => "per",
            Self::Religion => "rel",
            Self::SleightOfHand => "slt",
            Self::Stealth => "ste",
            Self::Survival => "sur",
        }
    }

    /// Parse a full skill name (case-insensitive, inner whitespace collapsed).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "acrobatics" => Some(Self::Acrobatics),
            "animal handling" => Some(Self::AnimalHandling),
            "arcana" => Some(Self::Arcana),
            "athletics" => Some(Self::Athletics),
            "deception" => Some(Self::Deception),
            "history" => Some(Self::History),
            "insight" => Some(Self::Insight),
            "intimidation" => Some(Self::Intimidation),
            "investigation" => Some(Self::Investigation),
            "medicine" => Some(Self::Medicine),
            "nature" => Some(Self::Nature),
            "perception" => Some(Self::Perception),
            "performance" => Some(Self::Performance),
            "persuasion" => Some(Self::Persuasion),
            "religion" => Some(Self::Religion),
            "sleight of hand" => Some(Self::SleightOfHand),
            "stealth" => Some(Self::Stealth),
            "survival" => Some(Self::Survival),
            _ => None,
        }
    }
}

// ============================================================================
// Damage and condition types
// ============================================================================

/// Standard damage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Acid,
    Bludgeoning,
    Cold,
    Fire,
    Force,
    Lightning,
    Necrotic,
    Piercing,
    Poison,
    Psychic,
    Radiant,
    Slashing,
    Thunder,
}

impl DamageType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "acid" => Some(Self::Acid),
            "bludgeoning" => Some(Self::Bludgeoning),
            "cold" => Some(Self::Cold),
            "fire" => Some(Self::Fire),
            "force" => Some(Self::Force),
            "lightning" => Some(Self::Lightning),
            "necrotic" => Some(Self::Necrotic),
            "piercing" => Some(Self::Piercing),
            "poison" => Some(Self::Poison),
            "psychic" => Some(Self::Psychic),
            "radiant" => Some(Self::Radiant),
            "slashing" => Some(Self::Slashing),
            "thunder" => Some(Self::Thunder),
            _ => None,
        }
    }
}

/// Standard condition types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Diseased,
    Exhaustion,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

impl Condition {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "blinded" => Some(Self::Blinded),
            "charmed" => Some(Self::Charmed),
            "deafened" => Some(Self::Deafened),
            "diseased" => Some(Self::Diseased),
            "exhaustion" => Some(Self::Exhaustion),
            "frightened" => Some(Self::Frightened),
            "grappled" => Some(Self::Grappled),
            "incapacitated" => Some(Self::Incapacitated),
            "invisible" => Some(Self::Invisible),
            "paralyzed" => Some(Self::Paralyzed),
            "petrified" => Some(Self::Petrified),
            "poisoned" => Some(Self::Poisoned),
            "prone" => Some(Self::Prone),
            "restrained" => Some(Self::Restrained),
            "stunned" => Some(Self::Stunned),
            "unconscious" => Some(Self::Unconscious),
            _ => None,
        }
    }
}

// ============================================================================
// Word lists
// ============================================================================

/// Known language tokens. Multi-word entries come first so they win over
/// their single-word prefixes when compiled into an alternation.
pub const KNOWN_LANGUAGES: &[&str] = &[
    "deep speech",
    "thieves' cant",
    "aarakocra",
    "abyssal",
    "aquan",
    "auran",
    "celestial",
    "common",
    "deep",
    "draconic",
    "druidic",
    "dwarvish",
    "elvish",
    "giant",
    "gith",
    "gnoll",
    "gnomish",
    "goblin",
    "halfling",
    "ignan",
    "infernal",
    "orc",
    "primordial",
    "sylvan",
    "terran",
    "cant",
    "undercommon",
];

/// Canonical creature types.
pub const KNOWN_CREATURE_TYPES: &[&str] = &[
    "aberration",
    "beast",
    "celestial",
    "construct",
    "dragon",
    "elemental",
    "fey",
    "fiend",
    "giant",
    "humanoid",
    "monstrosity",
    "ooze",
    "plant",
    "undead",
];

/// Encounter roles printed next to the challenge rating in some books.
pub const KNOWN_ROLES: &[&str] = &[
    "ambusher",
    "artillery",
    "brute",
    "controller",
    "defender",
    "leader",
    "minion",
    "retainer",
    "skirmisher",
    "soldier",
    "solo",
    "support",
];

/// Normalize a language to its canonical token ("Deep Speech" -> "deep").
pub fn canonical_language(language: &str) -> String {
    let lower = language.trim().to_lowercase();
    match lower.as_str() {
        "deep speech" => "deep".to_string(),
        "thieves' cant" | "thieves’ cant" => "cant".to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_modifier() {
        assert_eq!(Ability::modifier(10), 0);
        assert_eq!(Ability::modifier(8), -1);
        assert_eq!(Ability::modifier(9), -1);
        assert_eq!(Ability::modifier(14), 2);
        assert_eq!(Ability::modifier(20), 5);
        assert_eq!(Ability::modifier(1), -5);
        assert_eq!(Ability::modifier(3), -4);
    }

    #[test]
    fn test_ability_tokens_are_case_insensitive() {
        assert_eq!(Ability::from_token("STR"), Some(Ability::Str));
        assert_eq!(Ability::from_token("Wisdom"), Some(Ability::Wis));
        assert_eq!(Ability::from_token("luck"), None);
        assert_eq!(Ability::Cha.to_string(), "cha");
    }

    #[test]
    fn test_skill_names() {
        assert_eq!(Skill::from_name("Sleight  of Hand"), Some(Skill::SleightOfHand));
        assert_eq!(Skill::from_name("perception").map(|s| s.code()), Some("prc"));
        assert_eq!(Skill::from_name("Persuasion").map(|s| s.code()), Some("per"));
        assert_eq!(Skill::from_name("juggling"), None);
    }

    #[test]
    fn test_skill_serializes_as_code() {
        let json = serde_json::to_string(&Skill::Intimidation).unwrap();
        assert_eq!(json, "\"itm\"");
    }

    #[test]
    fn test_canonical_language() {
        assert_eq!(canonical_language("Deep Speech"), "deep");
        assert_eq!(canonical_language("Thieves' Cant"), "cant");
        assert_eq!(canonical_language("Elvish"), "elvish");
    }
}
