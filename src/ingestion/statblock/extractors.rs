//! Header-region field extractors.
//!
//! One function per labeled block. Each reads the block's combined text,
//! writes the matching record field, and leaves highlight spans on the block.
//! A pattern that does not match leaves the field unset.

use once_cell::sync::Lazy;
use regex::Regex;

use super::patterns::*;
use super::record::*;
use crate::ingestion::segmenter::{Block, MatchSpan};
use crate::ingestion::text::{capitalize_first, parse_fraction, parse_signed};
use crate::ingestion::vocabulary::{
    canonical_language, Ability, Condition, DamageType, Skill, KNOWN_CREATURE_TYPES, KNOWN_LANGUAGES,
    KNOWN_ROLES,
};

type CreatureBlock = Block<CreatureBlockId>;

fn span(field: &str, m: regex::Match<'_>) -> MatchSpan {
    MatchSpan::new(field, m.start(), m.end())
}

fn push_group_spans(block: &mut CreatureBlock, caps: &regex::Captures<'_>, fields: &[&str], offset: usize) {
    for field in fields {
        if let Some(m) = caps.name(field) {
            block.match_data.push(span(field, m).shifted(offset));
        }
    }
}

// ============================================================================
// Simple values
// ============================================================================

pub fn set_armor(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    let Some(caps) = ARMOR_DETAILS.captures(&line) else {
        return;
    };
    push_group_spans(block, &caps, &["ac", "types"], 0);

    let Some(ac) = caps.name("ac").and_then(|m| m.as_str().parse().ok()) else {
        return;
    };
    let types = caps
        .name("types")
        .map(|m| {
            m.as_str()
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    record.armor = Some(ArmorData { ac, types });
}

/// Hit points and souls share the "value (formula)" shape.
pub fn parse_roll(block: &mut CreatureBlock) -> Option<Roll> {
    let line = block.combined();
    let caps = ROLL_DETAILS.captures(&line)?;
    push_group_spans(block, &caps, &["value", "formula"], 0);

    let value = caps.name("value")?.as_str().parse().ok()?;
    let formula = caps.name("formula").map(|m| m.as_str().to_string());
    Some(Roll { value, formula })
}

pub fn set_proficiency_bonus(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    if let Some(caps) = PROFICIENCY_DETAILS.captures(&line) {
        push_group_spans(block, &caps, &["bonus"], 0);
        record.proficiency_bonus = caps.name("bonus").and_then(|m| m.as_str().parse().ok());
    }
}

pub fn set_challenge(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    let Some(caps) = CHALLENGE_DETAILS.captures(&line) else {
        return;
    };
    push_group_spans(block, &caps, &["cr", "xp", "xp24"], 0);

    let Some(cr_text) = caps.name("cr").map(|m| m.as_str()) else {
        return;
    };
    let cr = if cr_text == "½" {
        Some(0.5)
    } else if cr_text.contains('/') {
        parse_fraction(cr_text)
    } else {
        cr_text.parse::<f64>().ok()
    };
    let Some(cr) = cr else {
        return;
    };

    let xp = caps
        .name("xp")
        .or_else(|| caps.name("xp24"))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0);

    let role = ROLE_DETAILS
        .captures_iter(&line)
        .filter_map(|c| c.name("role").map(|m| m.as_str().to_lowercase()))
        .find(|role| KNOWN_ROLES.contains(&role.as_str()));

    record.challenge = Some(ChallengeData { cr, xp, role });
}

// ============================================================================
// Abilities
// ============================================================================

/// Scan lines for ability names and values independently, stopping once six
/// values are found.
pub fn set_abilities(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let mut names: Vec<Ability> = Vec::new();
    let mut values: Vec<i32> = Vec::new();
    let mut save_proficient: Vec<bool> = Vec::new();
    let mut spans = Vec::new();

    for line in &block.lines {
        if values.len() >= 6 {
            break;
        }
        let text = line.text.as_str();

        names.extend(ABILITY_NAMES.find_iter(text).filter_map(|m| Ability::from_token(m.as_str())));

        for caps in ABILITY_VALUES.captures_iter(text) {
            if let Some(base) = caps.name("base").and_then(|m| m.as_str().parse().ok()) {
                values.push(base);
                save_proficient.push(false);
            }
            if let Some(m) = caps.name("base") {
                spans.push(span("base", m).on_line(line.line_number));
            }
            if let Some(m) = caps.name("modifier") {
                spans.push(span("modifier", m).on_line(line.line_number));
            }
        }

        for caps in ABILITY_VALUES_24.captures_iter(text) {
            let Some(base) = caps.name("base").and_then(|m| m.as_str().parse().ok()) else {
                continue;
            };
            let modifier = caps.name("modifier").and_then(|m| parse_signed(m.as_str()));
            let save = caps.name("save").and_then(|m| parse_signed(m.as_str()));
            values.push(base);
            save_proficient.push(modifier != save);

            for field in ["base", "modifier", "save"] {
                if let Some(m) = caps.name(field) {
                    spans.push(span(field, m).on_line(line.line_number));
                }
            }
        }
    }

    block.match_data.extend(spans);

    record.abilities = names
        .iter()
        .zip(values.iter())
        .take(6)
        .map(|(&ability, &score)| AbilityScore { ability, score })
        .collect();

    for (ability, proficient) in names.iter().zip(save_proficient.iter()).take(6) {
        if *proficient && !record.saving_throws.contains(ability) {
            record.saving_throws.push(*ability);
        }
    }
}

pub fn set_saving_throws(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    for m in ABILITY_NAMES.find_iter(&line) {
        block.match_data.push(span("ability", m));
        if let Some(ability) = Ability::from_token(m.as_str()) {
            if !record.saving_throws.contains(&ability) {
                record.saving_throws.push(ability);
            }
        }
    }
}

pub fn set_skills(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    let mut skills = Vec::new();

    for caps in SKILL_DETAILS.captures_iter(&line) {
        push_group_spans(block, &caps, &["name", "modifier"], 0);
        let skill = caps.name("name").and_then(|m| Skill::from_name(m.as_str()));
        let modifier = caps.name("modifier").and_then(|m| parse_signed(m.as_str()));
        if let (Some(skill), Some(modifier)) = (skill, modifier) {
            skills.push(SkillValue { skill, modifier });
        }
    }

    record.skills = skills;
}

pub fn set_senses(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    let mut senses = Vec::new();

    for caps in SENSES_DETAILS.captures_iter(&line) {
        push_group_spans(block, &caps, &["name", "range"], 0);
        let name = caps.name("name").map(|m| m.as_str().to_string());
        let range = caps.name("range").and_then(|m| m.as_str().parse().ok());
        if let (Some(name), Some(range)) = (name, range) {
            senses.push(Sense { name, range });
        }
    }

    record.senses = senses;
}

pub fn set_speed(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    let mut speed = Speed::default();

    for caps in SPEED_DETAILS.captures_iter(&line) {
        let (Some(name), Some(value)) = (
            caps.name("name").map(|m| m.as_str().to_lowercase()),
            caps.name("value").and_then(|m| m.as_str().parse::<u32>().ok()),
        ) else {
            continue;
        };
        push_group_spans(block, &caps, &["name", "value"], 0);

        match name.as_str() {
            "speed" | "walk" => speed.walk = Some(value),
            "burrow" => speed.burrow = Some(value),
            "climb" => speed.climb = Some(value),
            "fly" => speed.fly = Some(value),
            "swim" => speed.swim = Some(value),
            _ => speed.other.push(NamedSpeed { name, value }),
        }
    }

    speed.hover = line.to_lowercase().contains("hover");
    record.speed = Some(speed);
}

pub fn set_racial_details(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let line = block.combined();
    let Some(caps) = RACIAL_DETAILS.captures(&line) else {
        return;
    };
    push_group_spans(block, &caps, &["size", "swarm", "type", "race", "alignment"], 0);

    let trimmed = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let written_type = trimmed("type").map(|t| t.to_lowercase()).unwrap_or_default();
    let mut singular = written_type
        .strip_suffix('s')
        .unwrap_or(&written_type)
        .to_string();
    if singular == "monstrositie" {
        singular = "monstrosity".to_string();
    }
    let known = KNOWN_CREATURE_TYPES.contains(&singular.as_str());

    record.racial_details = Some(RacialDetails {
        size: trimmed("size").unwrap_or_default(),
        swarm_size: trimmed("swarm"),
        creature_type: known.then(|| singular.clone()),
        custom_type: (!known && !written_type.is_empty()).then_some(written_type),
        race: trimmed("race"),
        alignment: trimmed("alignment"),
    });
}

// ============================================================================
// Damage, conditions, languages
// ============================================================================

/// Remove vocabulary hits and separators; whatever is left is free text.
fn residue(text: &str, vocabulary: &Regex) -> Option<String> {
    let stripped = vocabulary.replace_all(text, " ");
    let stripped = RESIDUE_SEPARATORS.replace_all(&stripped, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Matched vocabulary tokens with spans offset into the combined line.
fn vocabulary_hits<'t>(
    block: &mut CreatureBlock,
    text: &'t str,
    vocabulary: &Regex,
    field: &str,
    offset: usize,
) -> Vec<&'t str> {
    vocabulary
        .find_iter(text)
        .map(|m| {
            block.match_data.push(span(field, m).shifted(offset));
            m.as_str()
        })
        .collect()
}

/// Damage and condition lists for every damage/condition block type.
pub fn set_damages_and_conditions(block: &mut CreatureBlock, record: &mut CreatureRecord) {
    let combined = block.combined();
    let (body, offset) = match DAMAGE_CONDITION_HEADER.find(&combined) {
        Some(header) => {
            let rest = &combined[header.end()..];
            let leading = rest.len() - rest.trim_start().len();
            (rest.trim(), header.end() + leading)
        }
        None => (combined.trim(), 0),
    };

    // "cold, fire; bludgeoning from nonmagical attacks": the second clause is
    // custom text and its words are not vocabulary hits.
    let clauses: Vec<&str> = body.split(';').collect();
    let (vocabulary_text, clause_custom) = if clauses.len() == 2 {
        let custom = clauses[1].trim();
        (clauses[0], (!custom.is_empty()).then(|| custom.to_string()))
    } else {
        (body, None)
    };

    match block.id {
        CreatureBlockId::ConditionImmunities => {
            let mut set = DamageOrConditionSet::default();
            for token in vocabulary_hits(block, vocabulary_text, &CONDITION_TYPES, "condition", offset) {
                if let Some(condition) = Condition::from_token(token) {
                    set.insert(condition);
                }
            }
            set.custom_text = clause_custom.or_else(|| residue(body, &CONDITION_TYPES));
            record.condition_immunities = Some(set);
        }
        CreatureBlockId::Immunities => {
            let mut damage = DamageOrConditionSet::default();
            let mut conditions = DamageOrConditionSet::default();
            for token in vocabulary_hits(block, body, &DAMAGE_TYPES, "damageType", offset) {
                if let Some(damage_type) = DamageType::from_token(token) {
                    damage.insert(damage_type);
                }
            }
            for token in vocabulary_hits(block, body, &CONDITION_TYPES, "condition", offset) {
                if let Some(condition) = Condition::from_token(token) {
                    conditions.insert(condition);
                }
            }
            if !damage.is_empty() {
                record.damage_immunities = Some(damage);
            }
            if !conditions.is_empty() {
                record.condition_immunities = Some(conditions);
            }
        }
        id => {
            let mut set = DamageOrConditionSet::default();
            for token in vocabulary_hits(block, vocabulary_text, &DAMAGE_TYPES, "damageType", offset) {
                if let Some(damage_type) = DamageType::from_token(token) {
                    set.insert(damage_type);
                }
            }
            set.custom_text = clause_custom.or_else(|| residue(body, &DAMAGE_TYPES));

            match id {
                CreatureBlockId::DamageImmunities => record.damage_immunities = Some(set),
                CreatureBlockId::DamageResistances => record.damage_resistances = Some(set),
                CreatureBlockId::DamageVulnerabilities => record.damage_vulnerabilities = Some(set),
                other => log::debug!("No damage field for block {other}"),
            }
        }
    }
}

/// Compile the known-language matcher, longest tokens first.
pub fn language_regex(extra_languages: &[String]) -> Regex {
    let mut tokens: Vec<String> = KNOWN_LANGUAGES.iter().map(|l| l.to_string()).collect();
    for extra in extra_languages {
        let extra = extra.trim().to_lowercase();
        if !extra.is_empty() && !tokens.contains(&extra) {
            tokens.push(extra);
        }
    }
    tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));

    let alternation = tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"(?i)(?:\w+\s*\()?(?P<language>\b(?:{alternation})\b)\)?"))
        .expect("Failed to compile language regex")
}

pub fn set_languages(block: &mut CreatureBlock, record: &mut CreatureRecord, known_languages: &Regex) {
    const HEADER: &str = "Languages";

    let combined = block.combined();
    let rest = combined.get(HEADER.len()..).unwrap_or_default();
    let leading = rest.len() - rest.trim_start().len();
    let offset = HEADER.len() + leading;
    let line = rest.trim();

    let mut known = Vec::new();
    for caps in known_languages.captures_iter(line) {
        if let Some(m) = caps.name("language") {
            block.match_data.push(span("language", m).shifted(offset));
            let language = canonical_language(m.as_str());
            if !known.contains(&language) {
                known.push(language);
            }
        }
    }

    let leftover = known_languages.replace_all(line, "");
    let leftover = COMMA_RUNS.replace_all(&leftover, ";");
    let leftover = DOUBLE_COMMAS.replace_all(&leftover, ";");
    let unknown = leftover
        .trim_start_matches(';')
        .split(';')
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.chars().all(|c| matches!(c, '-' | '—' | '–' | ',')))
        .map(capitalize_first)
        .collect();

    record.languages = Some(Languages { known, unknown });
}

static COMMA_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(,\s)+").expect("Failed to compile comma regex"));
static DOUBLE_COMMAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",,+").expect("Failed to compile comma regex"));

// ============================================================================
// Tests
// ============================================================================
