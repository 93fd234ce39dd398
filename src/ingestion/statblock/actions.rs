//! Feature and action blocks.
//!
//! Prose blocks go through the assembler to become titled features. Each
//! feature then gets its mechanics read out of the text: attack and save
//! clauses, damage parts, ranges, recharge and uses. Spellcasting features
//! are also parsed into spellcasting records here.

use super::patterns::*;
use super::record::*;
use super::spellcasting::{describe, parse_spellcasting};
use crate::config::ParserConfig;
use crate::ingestion::assembler::{assemble, NameValue, DESCRIPTION};
use crate::ingestion::segmenter::Block;
use crate::ingestion::text::{camel_to_title, parse_signed};
use crate::ingestion::vocabulary::{Ability, DamageType};

const UTILITY_SPELLS: &str = "Utility Spells";

/// Assemble one action-like block and write its features into the record.
pub fn set_action_block(
    block: &Block<CreatureBlockId>,
    record: &mut CreatureRecord,
    config: &ParserConfig,
) {
    let lines = block.texts();
    // A hint can open a block on a content line, so only a real header is dropped
    let content = match lines.split_first() {
        Some((first, rest)) if classify(first, &[]) == Some(block.id) => rest,
        _ => &lines[..],
    };

    let entries = match block.id {
        CreatureBlockId::VillainActions => villain_entries(content),
        _ => assemble(content, config),
    };

    if block.id == CreatureBlockId::UtilitySpells {
        set_utility_spells(entries, record, config);
        return;
    }

    let mut features = Vec::with_capacity(entries.len());
    for entry in entries {
        let description = match spellcasting_entry(block.id, &entry) {
            Some(spellcasting) => {
                let description =
                    describe(&spellcasting, config.html_paragraphs).unwrap_or_else(|| entry.value.clone());
                store_spellcasting(record, spellcasting);
                description
            }
            None => entry.value.clone(),
        };

        let details = analyze_action(&entry.name, &description, block.id, &record.abilities);
        features.push(Feature {
            title: entry.name,
            description,
            level: None,
            details,
        });
    }

    log::debug!("{} features assembled for {}", features.len(), block.id);
    feature_list(record, block.id).extend(features);
}

fn feature_list(record: &mut CreatureRecord, id: CreatureBlockId) -> &mut Vec<Feature> {
    match id {
        CreatureBlockId::Actions => &mut record.actions,
        CreatureBlockId::BonusActions => &mut record.bonus_actions,
        CreatureBlockId::Reactions => &mut record.reactions,
        CreatureBlockId::LegendaryActions => &mut record.legendary_actions,
        CreatureBlockId::LairActions => &mut record.lair_actions,
        CreatureBlockId::MythicActions => &mut record.mythic_actions,
        CreatureBlockId::VillainActions => &mut record.villain_actions,
        _ => &mut record.features,
    }
}

/// Parse a spellcasting entry when the block and title call for one.
///
/// In the features blocks both spellcasting titles count, and the grammar
/// decides prepared vs innate. Elsewhere only a bare "Spellcasting" title
/// counts, and it is always innate.
fn spellcasting_entry(id: CreatureBlockId, entry: &NameValue) -> Option<Spellcasting> {
    match id {
        CreatureBlockId::Features | CreatureBlockId::Traits => SPELLCASTING_TITLE
            .is_match(&entry.name)
            .then(|| parse_spellcasting(&entry.name, &entry.value)),
        _ if entry.name.eq_ignore_ascii_case("spellcasting") => {
            let mut spellcasting = parse_spellcasting(&entry.name, &entry.value);
            spellcasting.kind = SpellcastingKind::Innate;
            Some(spellcasting)
        }
        _ => None,
    }
}

fn store_spellcasting(record: &mut CreatureRecord, spellcasting: Spellcasting) {
    let slot = match spellcasting.kind {
        SpellcastingKind::Prepared => &mut record.spellcasting,
        SpellcastingKind::Innate => &mut record.innate_spellcasting,
        SpellcastingKind::Utility => &mut record.utility_spells,
    };
    if slot.is_some() {
        log::debug!("Keeping the first {:?} spellcasting, ignoring '{}'", spellcasting.kind, spellcasting.title);
        return;
    }
    *slot = Some(spellcasting);
}

fn set_utility_spells(entries: Vec<NameValue>, record: &mut CreatureRecord, config: &ParserConfig) {
    let [entry] = entries.as_slice() else {
        log::debug!("Expected one utility spells entry, found {}", entries.len());
        return;
    };

    let mut spellcasting = parse_spellcasting(UTILITY_SPELLS, &entry.value);
    spellcasting.kind = SpellcastingKind::Utility;

    let description = describe(&spellcasting, config.html_paragraphs).unwrap_or_else(|| entry.value.clone());
    record.features.push(Feature {
        title: UTILITY_SPELLS.to_string(),
        description,
        level: None,
        details: None,
    });
    store_spellcasting(record, spellcasting);
}

/// `Action N: Title.` lines open entries; other lines continue the last one.
pub fn villain_entries<S: AsRef<str>>(lines: &[S]) -> Vec<NameValue> {
    let mut entries: Vec<NameValue> = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        if let Some(caps) = VILLAIN_ACTION_TITLE.captures(line) {
            let title = caps["title"].trim_end_matches(['.', '!', '?']);
            entries.push(NameValue::new(title, caps["description"].trim()));
        } else if let Some(last) = entries.last_mut() {
            if !last.value.is_empty() {
                last.value.push(' ');
            }
            last.value.push_str(line);
        } else {
            entries.push(NameValue::new(DESCRIPTION, line));
        }
    }

    entries
}

// ============================================================================
// Action details
// ============================================================================

/// Read mechanics out of an action's title and description.
///
/// Multiattack gets no details. Text without any recognized mechanics
/// still yields details carrying the cleaned name and activation.
pub fn analyze_action(
    name: &str,
    description: &str,
    block: CreatureBlockId,
    abilities: &[AbilityScore],
) -> Option<ActionDetails> {
    if name.to_lowercase().starts_with("multiattack") {
        return None;
    }

    let recharge = RECHARGE
        .captures(name)
        .and_then(|c| c.name("recharge"))
        .and_then(|m| m.as_str().parse().ok());
    let per_day = PER_DAY
        .captures(name)
        .and_then(|c| c.name("per_day"))
        .and_then(|m| m.as_str().parse().ok());
    let legendary_resistance = name.to_lowercase().starts_with("legendary resistance");

    let activation = match block {
        CreatureBlockId::Actions => Activation::Action,
        CreatureBlockId::BonusActions => Activation::BonusAction,
        CreatureBlockId::Reactions => Activation::Reaction,
        CreatureBlockId::LegendaryActions | CreatureBlockId::VillainActions => Activation::Legendary,
        CreatureBlockId::LairActions => Activation::Lair,
        CreatureBlockId::MythicActions => Activation::Mythic,
        _ if recharge.is_some() || per_day.is_some() || legendary_resistance => Activation::Special,
        _ => Activation::Passive,
    };

    let action_cost = match activation {
        Activation::Passive | Activation::Special => None,
        _ if block == CreatureBlockId::VillainActions => None,
        _ => Some(
            ACTION_COST
                .captures(name)
                .and_then(|c| c.name("cost"))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1),
        ),
    };

    let display_name = if name == DESCRIPTION {
        camel_to_title(block.as_str())
    } else {
        clean_name(name, legendary_resistance)
    };

    // Everything before the saving throw clause may be an attack
    let save_caps = SAVING_THROW_DETAILS
        .captures(description)
        .or_else(|| SAVING_THROW_DETAILS_24.captures(description));
    let (attack_text, save_text) = match save_caps.as_ref().and_then(|c| c.get(0)) {
        Some(m) => (&description[..m.start()], &description[m.start()..]),
        None => (description, ""),
    };

    let save = save_caps.as_ref().and_then(|caps| {
        Some(SaveInfo {
            dc: caps.name("dc")?.as_str().parse().ok()?,
            ability: caps.name("ability").and_then(|m| Ability::from_token(m.as_str())),
        })
    });

    let reach = capture_number(&REACH, description, "reach");
    let range = RANGE.captures(description).and_then(|caps| {
        Some(RangeInfo {
            near: caps.name("near")?.as_str().parse().ok()?,
            far: caps.name("far").and_then(|m| m.as_str().parse().ok()),
        })
    });

    let attack = ATTACK
        .captures(attack_text)
        .or_else(|| ATTACK_24.captures(attack_text))
        .and_then(|caps| caps.name("to_hit")?.as_str().parse().ok())
        .map(|to_hit| AttackInfo {
            to_hit,
            reach: if range.is_some() {
                Some(AttackReach::Ranged)
            } else if reach.is_some() {
                Some(AttackReach::Melee)
            } else {
                None
            },
            source: if SPELL_ATTACK.is_match(description) {
                AttackSource::Spell
            } else {
                AttackSource::Weapon
            },
        });

    let damage = if attack.is_some() {
        damage_parts(attack_text)
    } else {
        Vec::new()
    };
    let save_damage = if save.is_some() {
        damage_parts(save_text)
    } else {
        Vec::new()
    };

    let ability = match &attack {
        Some(a) if a.source == AttackSource::Spell => None,
        Some(a) if a.reach == Some(AttackReach::Ranged) => Some(Ability::Dex),
        Some(_) => modifier_ability(&damage, abilities).or_else(|| stronger_physical(abilities)),
        None => modifier_ability(&save_damage, abilities),
    };

    Some(ActionDetails {
        name: display_name,
        activation,
        action_cost,
        attack,
        save,
        ability,
        damage,
        save_damage,
        versatile: VERSATILE
            .captures(description)
            .and_then(|c| c.name("roll"))
            .map(|m| m.as_str().to_string()),
        reach,
        range,
        target: TARGET.captures(description).and_then(|caps| {
            Some(AreaTarget {
                size: caps.name("size").and_then(|m| m.as_str().parse().ok()),
                shape: caps.name("shape")?.as_str().to_lowercase(),
            })
        }),
        recharge,
        per_day,
    })
}

fn capture_number(pattern: &regex::Regex, text: &str, group: &str) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|c| c.name(group))
        .and_then(|m| m.as_str().parse().ok())
}

fn clean_name(name: &str, legendary_resistance: bool) -> String {
    let cleaned = RECHARGE.replace_all(name, "");
    let mut cleaned = ACTION_COST.replace_all(&cleaned, "").into_owned();
    if legendary_resistance {
        cleaned = LEGENDARY_RESISTANCE.replace_all(&cleaned, "").into_owned();
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Up to two damage components from the first damage clause.
pub fn damage_parts(text: &str) -> Vec<DamagePart> {
    let Some(caps) = DAMAGE_ROLL.captures(text) else {
        return Vec::new();
    };

    [("roll1", "mod1", "type1"), ("roll2", "mod2", "type2")]
        .into_iter()
        .filter_map(|(roll, modifier, kind)| {
            Some(DamagePart {
                formula: caps.name(roll)?.as_str().to_string(),
                modifier: caps
                    .name(modifier)
                    .and_then(|m| parse_signed(&m.as_str().replace(' ', ""))),
                damage_type: DamageType::from_token(caps.name(kind)?.as_str()),
            })
        })
        .collect()
}

/// The first ability whose modifier equals the first damage modifier.
fn modifier_ability(damage: &[DamagePart], abilities: &[AbilityScore]) -> Option<Ability> {
    let modifier = damage.first()?.modifier?;
    Ability::ALL.into_iter().find(|ability| {
        abilities
            .iter()
            .any(|a| a.ability == *ability && a.modifier() == modifier)
    })
}

fn stronger_physical(abilities: &[AbilityScore]) -> Option<Ability> {
    let score = |ability| abilities.iter().find(|a| a.ability == ability).map(|a| a.score);
    match (score(Ability::Str), score(Ability::Dex)) {
        (Some(str_score), Some(dex_score)) if dex_score > str_score => Some(Ability::Dex),
        (Some(_), _) => Some(Ability::Str),
        (None, Some(_)) => Some(Ability::Dex),
        (None, None) => None,
    }
}

// ============================================================================
// Creature-level counts
// ============================================================================

/// Legendary action count, lair initiative, and legendary resistance uses.
pub fn set_action_counts(record: &mut CreatureRecord, has_legendary: bool) {
    if has_legendary {
        let count = record
            .legendary_actions
            .iter()
            .find_map(|f| capture_number(&LEGENDARY_ACTION_COUNT, &f.description, "count"));
        record.legendary_action_count = Some(count.unwrap_or(3));
    }

    let initiative = record
        .lair_actions
        .iter()
        .find_map(|f| capture_number(&LAIR_INITIATIVE, &f.description, "count"));
    record.lair_initiative = match initiative {
        Some(count) => Some(count),
        None if !record.lair_actions.is_empty() => Some(20),
        None => None,
    };

    record.legendary_resistance = record
        .features
        .iter()
        .filter(|f| f.title.to_lowercase().starts_with("legendary resistance"))
        .find_map(|f| capture_number(&LEGENDARY_RESISTANCE, &f.title, "per_day"));
}

// ============================================================================
// Tests
// ============================================================================
