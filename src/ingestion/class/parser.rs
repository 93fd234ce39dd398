//! Class writeup parser.
//!
//! The text is cleaned of markdown first, then segmented on header
//! phrases. Level and hit die are read before the other blocks since
//! feature levels and the hit point formula fall back to them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::patterns::*;
use super::record::{ClassFeature, ClassRecord, ClassSpell};
use crate::ingestion::segmenter::{segment, Block, LineHint, Segmentation};
use crate::ingestion::statblock::record::Roll;
use crate::ingestion::vocabulary::{Ability, Skill};

type ClassBlock = Block<ClassBlockId>;

// ============================================================================
// Input cleanup
// ============================================================================

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]*").expect("Failed to compile heading regex"));

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").expect("Failed to compile bullet regex"));

static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*|__|\*|`").expect("Failed to compile emphasis regex"));

/// Strip markdown and normalize line endings and spaces.
pub fn clean_input(text: &str) -> String {
    let text = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ");
    let text = HEADING.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "• ");
    EMPHASIS.replace_all(&text, "").into_owned()
}

// ============================================================================
// Parser
// ============================================================================

/// Class record plus the block map it was extracted from.
#[derive(Debug, Clone, Serialize)]
pub struct ClassParse {
    pub class: ClassRecord,
    pub blocks: Segmentation<ClassBlockId>,
}

/// Parses class writeups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassParser;

impl ClassParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one writeup. Returns `None` for empty or whitespace-only input.
    pub fn parse(&self, text: &str, hints: &[LineHint<ClassBlockId>]) -> Option<ClassParse> {
        let cleaned = clean_input(text);
        let blocks = segment(&ClassRegistry, &cleaned, hints)?;

        let name = blocks
            .get(ClassBlockId::Name)
            .and_then(|block| block.lines.first())
            .map(|line| line.text.clone())
            .unwrap_or_default();
        let mut class = ClassRecord::new(name);

        if let Some(block) = blocks.get(ClassBlockId::Level) {
            set_level(block, &mut class);
        }
        if let Some(block) = blocks.get(ClassBlockId::HitDie) {
            set_hit_die(block, &mut class);
        }

        for block in blocks.blocks.values() {
            extract_block(block, &mut class);
        }

        log::info!(
            "Parsed class '{}': {} blocks, {} features",
            class.name,
            blocks.blocks.len(),
            class.class_features.len() + class.subclass_features.len()
        );

        Some(ClassParse { class, blocks })
    }
}

fn extract_block(block: &ClassBlock, class: &mut ClassRecord) {
    use ClassBlockId::*;

    match block.id {
        Name | Level | HitDie => {}
        HitPoints => set_hit_points(block, class),
        ProficiencyBonus => {
            class.proficiency_bonus = PROFICIENCY_BONUS_DETAILS
                .captures(&body(&block.combined(), block.id))
                .and_then(|c| c["bonus"].parse().ok());
        }
        ArmorProficiencies => class.armor_proficiencies = proficiency_list(block),
        WeaponProficiencies => class.weapon_proficiencies = proficiency_list(block),
        ToolProficiencies => class.tool_proficiencies = proficiency_list(block),
        SavingThrows => set_saving_throws(block, class),
        Skills => set_skills(block, class),
        Equipment => {
            class.equipment = body(&block.combined(), block.id)
                .split('•')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
        }
        ClassFeatures => class.class_features = features(block, class.level),
        SubclassFeatures => class.subclass_features = features(block, class.level),
        Subclass => {
            class.subclass = block.lines.first().map(|line| match line.text.split_once(':') {
                Some((_, rest)) => rest.trim().to_string(),
                None => line.text.clone(),
            });
        }
        Spellcasting => set_spellcasting_ability(block, class),
        SpellSlots => class.spell_slots = non_empty(body(&block.combined(), block.id)),
        Cantrips => {
            class.cantrips = split_list(&body(&block.combined(), block.id))
                .filter(|spell| !CANTRIP.is_match(spell))
                .collect();
        }
        Spells => class.spells = spells(block),
        Multiclassing => class.multiclassing = non_empty(body(&block.combined(), block.id)),
        OtherBlock => class.other_info = non_empty(block.combined()),
    }
}

/// Text after the header: everything past the first colon, or past the
/// header phrase when there is no colon.
fn body(text: &str, id: ClassBlockId) -> String {
    if let Some((_, rest)) = text.split_once(':') {
        return rest.trim().to_string();
    }
    match id.header().and_then(|header| header.find(text)) {
        Some(m) => text[m.end()..].trim().to_string(),
        None => text.trim().to_string(),
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn split_list(text: &str) -> impl Iterator<Item = String> + '_ {
    LIST_SEPARATORS
        .split(text)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Extractors
// ============================================================================

fn set_level(block: &ClassBlock, class: &mut ClassRecord) {
    class.level = LEVEL_DETAILS
        .captures(&block.combined())
        .and_then(|c| c["level"].parse().ok());
}

fn set_hit_die(block: &ClassBlock, class: &mut ClassRecord) {
    class.hit_die = HIT_DIE_DETAILS.captures(&block.combined()).map(|caps| {
        let count = match &caps["count"] {
            "" => "1",
            count => count,
        };
        format!("{count}d{}", &caps["sides"])
    });
}

/// Only the first line counts; later lines usually describe higher levels.
fn set_hit_points(block: &ClassBlock, class: &mut ClassRecord) {
    let Some(first) = block.lines.first() else {
        return;
    };
    let text = body(&first.text, block.id);
    let Some(caps) = HIT_POINTS_DETAILS.captures(&text) else {
        log::debug!("No hit point value in '{}'", first.text);
        return;
    };
    let Some(value) = caps["value"].parse().ok() else {
        return;
    };

    let formula = caps
        .name("formula")
        .map(|m| m.as_str().trim().to_string())
        .filter(|f| !f.is_empty())
        .or_else(|| class.hit_die.clone());
    class.hit_points = Some(Roll { value, formula });
}

fn proficiency_list(block: &ClassBlock) -> Vec<String> {
    body(&block.combined(), block.id)
        .split([',', ';'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn set_saving_throws(block: &ClassBlock, class: &mut ClassRecord) {
    let text = body(&block.combined(), block.id);
    for ability in ABILITY_TOKENS
        .find_iter(&text)
        .filter_map(|m| Ability::from_token(m.as_str()))
    {
        if !class.saving_throws.contains(&ability) {
            class.saving_throws.push(ability);
        }
    }
}

fn set_skills(block: &ClassBlock, class: &mut ClassRecord) {
    let text = body(&block.combined(), block.id);
    for skill in SKILL_TOKENS
        .find_iter(&text)
        .filter_map(|m| Skill::from_name(m.as_str()))
    {
        if !class.skills.contains(&skill) {
            class.skills.push(skill);
        }
    }
}

fn set_spellcasting_ability(block: &ClassBlock, class: &mut ClassRecord) {
    let combined = block.combined();
    let stated = SPELLCASTING_ABILITY
        .captures(&combined)
        .and_then(|caps| Ability::from_token(&caps["ability"]));

    // "Spellcasting: Intelligence"
    let leading = || {
        let text = body(&combined, block.id);
        ABILITY_TOKENS
            .find(&text)
            .filter(|m| m.start() == 0)
            .and_then(|m| Ability::from_token(m.as_str()))
    };

    class.spellcasting_ability = stated.or_else(leading);
}

/// Short capitalized lines open features, with an optional `(Level N)`.
/// A title without a level suffix must not end in punctuation.
fn feature_title(line: &str) -> Option<(String, Option<u32>)> {
    if !line.chars().next().is_some_and(char::is_uppercase) {
        return None;
    }
    let caps = FEATURE_TITLE.captures(line)?;
    let name = caps["name"].trim();
    let level = caps.name("level").and_then(|m| m.as_str().parse().ok());

    if name.split_whitespace().count() > 6 {
        return None;
    }
    if level.is_none() && name.ends_with(['.', '!', '?', ':', ';', ',']) {
        return None;
    }
    Some((name.to_string(), level))
}

fn features(block: &ClassBlock, class_level: Option<u32>) -> Vec<ClassFeature> {
    let default_level = class_level.unwrap_or(1);
    let mut features: Vec<ClassFeature> = Vec::new();

    for (index, line) in block.lines.iter().enumerate() {
        let text = if index == 0 && block.id.header().is_some_and(|h| h.is_match(&line.text)) {
            body(&line.text, block.id)
        } else {
            line.text.clone()
        };
        if text.is_empty() {
            continue;
        }

        if let Some((name, level)) = feature_title(&text) {
            features.push(ClassFeature {
                name,
                level: level.unwrap_or(default_level),
                description: String::new(),
            });
        } else if let Some(current) = features.last_mut() {
            if !current.description.is_empty() {
                current.description.push(' ');
            }
            current.description.push_str(&text);
        } else {
            log::debug!("Feature text before any title: '{text}'");
        }
    }

    features
}

fn spells(block: &ClassBlock) -> Vec<ClassSpell> {
    let mut spells = Vec::new();
    let mut level = 0;

    for (index, line) in block.lines.iter().enumerate() {
        let mut text = line.text.as_str();
        if index == 0 && block.id.header().is_some_and(|h| h.is_match(text)) {
            text = text.split_once(':').map_or("", |(_, rest)| rest);
        }

        if let Some(caps) = SPELL_LEVEL.captures(text) {
            level = caps["level"].parse().unwrap_or(level);
            text = text.split_once(':').map_or("", |(_, rest)| rest);
        } else if CANTRIP.is_match(text) && text.contains(':') {
            level = 0;
            text = text.split_once(':').map_or("", |(_, rest)| rest);
        }

        spells.extend(split_list(text).map(|name| ClassSpell { name, level }));
    }

    spells
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const WIZARD: &str = "# Wizard
**Level:** 3
**Hit Die:** d6
**Hit Points:** 6 + your Constitution modifier
**Proficiency Bonus:** +2
Armor Proficiencies: None
Weapon Proficiencies: Daggers, darts; slings, quarterstaffs
Saving Throws: Intelligence, Wisdom, INT
Skills: Choose two from Arcana, History, Insight, and Arcana
Equipment:
- a quarterstaff
- a spellbook
Class Features:
Arcane Recovery (Level 1)
You can regain some of your magical energy
by studying your spellbook.
Ritual Casting
You can cast a wizard spell as a ritual.
Spellcasting: Intelligence is your spellcasting ability for your wizard spells.
Cantrips Known: fire bolt, light; mage hand
Spells Known:
1st Level: magic missile, shield
2nd level
misty step
Multiclassing: Intelligence 13";

    #[test]
    fn test_clean_input() {
        let cleaned = clean_input("## Fighter\r\n**Hit Die:** `d10`\r\n* second wind\u{a0}bonus");
        assert_eq!(cleaned, "Fighter\nHit Die: d10\n• second wind bonus");
    }

    #[test]
    fn test_empty_input() {
        assert!(ClassParser::new().parse("\n  \n", &[]).is_none());
    }

    #[test]
    fn test_wizard_header_fields() {
        let parsed = ClassParser::new().parse(WIZARD, &[]).unwrap();
        let wizard = &parsed.class;

        assert_eq!(wizard.name, "Wizard");
        assert_eq!(wizard.level, Some(3));
        assert_eq!(wizard.hit_die.as_deref(), Some("1d6"));
        let hp = wizard.hit_points.as_ref().unwrap();
        assert_eq!(hp.value, 6);
        assert_eq!(hp.formula.as_deref(), Some("your Constitution modifier"));
        assert_eq!(wizard.proficiency_bonus, Some(2));
        assert_eq!(wizard.armor_proficiencies, vec!["None"]);
        assert_eq!(
            wizard.weapon_proficiencies,
            vec!["Daggers", "darts", "slings", "quarterstaffs"]
        );
        assert_eq!(wizard.saving_throws, vec![Ability::Int, Ability::Wis]);
        assert_eq!(wizard.skills, vec![Skill::Arcana, Skill::History, Skill::Insight]);
        assert_eq!(wizard.equipment, vec!["a quarterstaff", "a spellbook"]);
        assert_eq!(wizard.multiclassing.as_deref(), Some("Intelligence 13"));
    }

    #[test]
    fn test_wizard_features() {
        let parsed = ClassParser::new().parse(WIZARD, &[]).unwrap();
        let features = &parsed.class.class_features;

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].name, "Arcane Recovery");
        assert_eq!(features[0].level, 1);
        assert_eq!(
            features[0].description,
            "You can regain some of your magical energy by studying your spellbook."
        );
        assert_eq!(features[1].name, "Ritual Casting");
        assert_eq!(features[1].level, 3);
    }

    #[test]
    fn test_wizard_spells() {
        let parsed = ClassParser::new().parse(WIZARD, &[]).unwrap();
        let wizard = &parsed.class;

        assert_eq!(wizard.spellcasting_ability, Some(Ability::Int));
        assert_eq!(wizard.cantrips, vec!["fire bolt", "light", "mage hand"]);
        assert_eq!(
            wizard.spells,
            vec![
                ClassSpell { name: "magic missile".to_string(), level: 1 },
                ClassSpell { name: "shield".to_string(), level: 1 },
                ClassSpell { name: "misty step".to_string(), level: 2 },
            ]
        );
    }

    #[test]
    fn test_hit_points_fall_back_to_hit_die() {
        let parsed = ClassParser::new()
            .parse("Monk\nHit Die: 1d8 per monk level\nHit Points: 8", &[])
            .unwrap();
        let hp = parsed.class.hit_points.unwrap();
        assert_eq!(hp.value, 8);
        assert_eq!(hp.formula.as_deref(), Some("1d8"));
    }

    #[test]
    fn test_subclass_and_features() {
        let parsed = ClassParser::new()
            .parse(
                "Barbarian\nPath of the Berserker\nSubclass Features:\nFrenzy (Level 3)\nYou can go into a frenzy.",
                &[],
            )
            .unwrap();
        assert_eq!(parsed.class.subclass.as_deref(), Some("Path of the Berserker"));
        assert_eq!(parsed.class.subclass_features.len(), 1);
        assert_eq!(parsed.class.subclass_features[0].level, 3);
        assert_eq!(parsed.class.subclass_features[0].description, "You can go into a frenzy.");
    }

    #[test]
    fn test_other_block_by_hint() {
        let hints = [LineHint::new("A scholarly magic-user.", ClassBlockId::OtherBlock)];
        let parsed = ClassParser::new()
            .parse("Wizard\nA scholarly magic-user.\nCapable of manipulating reality.", &hints)
            .unwrap();
        assert_eq!(
            parsed.class.other_info.as_deref(),
            Some("A scholarly magic-user. Capable of manipulating reality.")
        );
    }

    #[test]
    fn test_repeated_header_reuses_block() {
        let parsed = ClassParser::new()
            .parse("Rogue\nSkills: Stealth\nLevel: 2\nSkills: Acrobatics, Stealth", &[])
            .unwrap();
        assert_eq!(parsed.class.skills, vec![Skill::Stealth, Skill::Acrobatics]);
        assert_eq!(parsed.blocks.get(ClassBlockId::Skills).unwrap().lines.len(), 2);
    }
}
