//! Creature record types.
//!
//! Every field is independent and optional from the parser's point of view;
//! a partially filled record is a normal result.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ingestion::vocabulary::{Ability, Condition, DamageType, Skill};

/// A flat value with an optional dice expression ("7 (2d6)").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub value: i32,
    pub formula: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorData {
    pub ac: i32,
    /// Armor sources such as "natural armor" or "leather armor", "shield"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeData {
    pub cr: f64,
    pub xp: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub ability: Ability,
    pub score: i32,
}

impl AbilityScore {
    pub fn modifier(&self) -> i32 {
        Ability::modifier(self.score)
    }
}

impl fmt::Display for AbilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({:+})",
            self.ability.code().to_uppercase(),
            self.score,
            self.modifier()
        )
    }
}

/// Standard vocabulary hits plus whatever free text was left over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOrConditionSet<T> {
    pub standard_types: Vec<T>,
    pub custom_text: Option<String>,
}

impl<T> Default for DamageOrConditionSet<T> {
    fn default() -> Self {
        Self {
            standard_types: Vec::new(),
            custom_text: None,
        }
    }
}

impl<T: PartialEq> DamageOrConditionSet<T> {
    /// Add a standard type, keeping first-seen order.
    pub fn insert(&mut self, value: T) {
        if !self.standard_types.contains(&value) {
            self.standard_types.push(value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.standard_types.is_empty() && self.custom_text.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Languages {
    /// Canonical lowercase tokens from the known-language vocabulary
    pub known: Vec<String>,
    /// Leftover entries, first letter capitalized
    pub unknown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    pub name: String,
    pub range: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillValue {
    pub skill: Skill,
    pub modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSpeed {
    pub name: String,
    pub value: u32,
}

/// Movement speeds in feet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speed {
    pub walk: Option<u32>,
    pub burrow: Option<u32>,
    pub climb: Option<u32>,
    pub fly: Option<u32>,
    pub swim: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hover: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<NamedSpeed>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacialDetails {
    pub size: String,
    pub swarm_size: Option<String>,
    /// Singularized type from the known creature types
    pub creature_type: Option<String>,
    /// The written type when it is not a known creature type
    pub custom_type: Option<String>,
    pub race: Option<String>,
    pub alignment: Option<String>,
}

// ============================================================================
// Features and actions
// ============================================================================

/// How an action is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Passive,
    Special,
    Action,
    BonusAction,
    Reaction,
    Legendary,
    Lair,
    Mythic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackReach {
    Melee,
    Ranged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackSource {
    Weapon,
    Spell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackInfo {
    pub to_hit: i32,
    pub reach: Option<AttackReach>,
    pub source: AttackSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveInfo {
    pub dc: u32,
    pub ability: Option<Ability>,
}

/// One damage component: dice, optional flat modifier, type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamagePart {
    pub formula: String,
    pub modifier: Option<i32>,
    pub damage_type: Option<DamageType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeInfo {
    pub near: u32,
    pub far: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaTarget {
    pub size: Option<u32>,
    pub shape: String,
}

/// Mechanics read out of an action's name and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDetails {
    /// Display name with recharge and cost parentheticals removed
    pub name: String,
    pub activation: Activation,
    pub action_cost: Option<u32>,
    pub attack: Option<AttackInfo>,
    pub save: Option<SaveInfo>,
    /// Ability driving the attack or damage, when it could be inferred
    pub ability: Option<Ability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub damage: Vec<DamagePart>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub save_damage: Vec<DamagePart>,
    pub versatile: Option<String>,
    pub reach: Option<u32>,
    pub range: Option<RangeInfo>,
    pub target: Option<AreaTarget>,
    pub recharge: Option<u32>,
    pub per_day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ActionDetails>,
}

impl Feature {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: None,
            details: None,
        }
    }
}

// ============================================================================
// Spellcasting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellcastingKind {
    /// Ordinal level groups ("1st level (4 slots):")
    Prepared,
    /// Frequency groups ("At will:", "3/day each:")
    Innate,
    Utility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellUses {
    Slots(u32),
    PerDay(u32),
    AtWill,
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellGroup {
    pub header: String,
    pub spells: Vec<String>,
    pub uses: SpellUses,
    /// Spell level from an ordinal header; 0 for cantrips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spellcasting {
    pub kind: SpellcastingKind,
    pub title: String,
    /// Text before the first group header
    pub intro: String,
    pub groups: Vec<SpellGroup>,
    pub save_dc: Option<u32>,
    pub ability: Option<Ability>,
    pub caster_level: Option<u32>,
}

impl Spellcasting {
    pub fn spell_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flat_map(|g| g.spells.iter().map(String::as_str))
    }
}

// ============================================================================
// Record
// ============================================================================

/// Names a post-parse lookup could not resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIssues {
    pub missing_spells: Vec<String>,
    pub missing_items: Vec<String>,
}

impl ImportIssues {
    pub fn is_empty(&self) -> bool {
        self.missing_spells.is_empty() && self.missing_items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub name: String,
    pub armor: Option<ArmorData>,
    pub health: Option<Roll>,
    pub souls: Option<Roll>,
    pub speed: Option<Speed>,
    pub abilities: Vec<AbilityScore>,
    pub saving_throws: Vec<Ability>,
    pub skills: Vec<SkillValue>,
    pub damage_immunities: Option<DamageOrConditionSet<DamageType>>,
    pub damage_resistances: Option<DamageOrConditionSet<DamageType>>,
    pub damage_vulnerabilities: Option<DamageOrConditionSet<DamageType>>,
    pub condition_immunities: Option<DamageOrConditionSet<Condition>>,
    pub senses: Vec<Sense>,
    pub languages: Option<Languages>,
    pub challenge: Option<ChallengeData>,
    pub proficiency_bonus: Option<i32>,
    pub racial_details: Option<RacialDetails>,

    pub features: Vec<Feature>,
    pub actions: Vec<Feature>,
    pub bonus_actions: Vec<Feature>,
    pub reactions: Vec<Feature>,
    pub legendary_actions: Vec<Feature>,
    pub lair_actions: Vec<Feature>,
    pub mythic_actions: Vec<Feature>,
    pub villain_actions: Vec<Feature>,

    pub spellcasting: Option<Spellcasting>,
    pub innate_spellcasting: Option<Spellcasting>,
    pub utility_spells: Option<Spellcasting>,

    pub legendary_action_count: Option<u32>,
    pub lair_initiative: Option<u32>,
    pub legendary_resistance: Option<u32>,

    #[serde(default)]
    pub import_issues: ImportIssues,
}

impl CreatureRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Score for an ability, if it was extracted.
    pub fn ability_score(&self, ability: Ability) -> Option<i32> {
        self.abilities
            .iter()
            .find(|a| a.ability == ability)
            .map(|a| a.score)
    }

    /// Every spellcasting record present, in a fixed order.
    pub fn spellcasting_records(&self) -> impl Iterator<Item = &Spellcasting> {
        [&self.spellcasting, &self.innate_spellcasting, &self.utility_spells]
            .into_iter()
            .flatten()
    }
}
