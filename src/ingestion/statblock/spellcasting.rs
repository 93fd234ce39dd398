//! Spellcasting feature parsing.
//!
//! Two group grammars are tried in order: frequency headers ("At will:",
//! "3/day each:") and then ordinal level headers ("1st level (4 slots):").
//! The first grammar with any header wins. With no headers at all, a single
//! "can innately cast <spell>," clause is the fallback.

use super::patterns::{
    PER_DAY, SPELLCASTER_LEVEL, SPELLCASTING_ABILITY, SPELL_ACTIVATION_SUFFIX, SPELL_GROUP_LEVEL,
    SPELL_INNATE_LINE, SPELL_INNATE_SINGLE, SPELL_LINE, SPELL_SAVE_DC, SPELL_SLOTS,
};
use super::record::{SpellGroup, SpellUses, Spellcasting, SpellcastingKind};
use crate::ingestion::text::{capitalize_all, split_outside_parens, trim_suffix};
use crate::ingestion::vocabulary::Ability;

/// Parse a spellcasting feature's title and body.
pub fn parse_spellcasting(title: &str, text: &str) -> Spellcasting {
    let mut kind = SpellcastingKind::Innate;
    let mut headers: Vec<regex::Match<'_>> = SPELL_INNATE_LINE.find_iter(text).collect();

    if headers.is_empty() {
        kind = SpellcastingKind::Prepared;
        headers = SPELL_LINE.find_iter(text).collect();
    }

    let mut groups = Vec::new();
    let intro = match headers.first() {
        Some(first) => text[..first.start()].trim().to_string(),
        None => text.trim().to_string(),
    };

    for (idx, header) in headers.iter().enumerate() {
        let end = headers.get(idx + 1).map_or(text.len(), |next| next.start());
        let header_text = trim_suffix(header.as_str(), ":").trim().to_string();
        let spells = clean_spell_names(&text[header.end()..end]);
        groups.push(SpellGroup {
            uses: group_uses(&header_text),
            level: group_level(&header_text),
            header: header_text,
            spells,
        });
    }

    if groups.is_empty() {
        kind = SpellcastingKind::Innate;
        if let Some(spell) = SPELL_INNATE_SINGLE
            .captures(text)
            .and_then(|c| c.name("spell"))
            .map(|m| capitalize_all(m.as_str().trim()))
        {
            let uses = PER_DAY
                .captures(title)
                .and_then(|c| c.name("per_day"))
                .and_then(|m| m.as_str().parse().ok())
                .map_or(SpellUses::Unspecified, SpellUses::PerDay);
            groups.push(SpellGroup {
                header: title.to_string(),
                spells: vec![spell],
                uses,
                level: None,
            });
        }
    }

    if groups.is_empty() {
        log::debug!("No spell groups found in '{title}'");
    }

    Spellcasting {
        kind,
        title: title.to_string(),
        save_dc: SPELL_SAVE_DC
            .captures(&intro)
            .and_then(|c| c.name("dc"))
            .and_then(|m| m.as_str().parse().ok()),
        ability: spellcasting_ability(&intro),
        caster_level: SPELLCASTER_LEVEL
            .captures(&intro)
            .and_then(|c| c.name("level"))
            .and_then(|m| m.as_str().parse().ok()),
        intro,
        groups,
    }
}

/// Split a group's member list on commas outside parentheses and tidy each name.
pub fn clean_spell_names(list: &str) -> Vec<String> {
    split_outside_parens(list, ',')
        .into_iter()
        .map(|spell| {
            let spell = spell.replace('*', "");
            let spell = trim_suffix(spell.trim(), ".");
            let spell = SPELL_ACTIVATION_SUFFIX.replace(spell, "");
            capitalize_all(spell.trim())
        })
        .filter(|spell| !spell.is_empty())
        .collect()
}

fn group_uses(header: &str) -> SpellUses {
    let lower = header.to_lowercase();

    if let Some(slots) = SPELL_SLOTS
        .captures(&lower)
        .and_then(|c| c.name("slots"))
        .and_then(|m| m.as_str().parse().ok())
    {
        return SpellUses::Slots(slots);
    }
    if let Some(per_day) = PER_DAY
        .captures(&lower)
        .and_then(|c| c.name("per_day"))
        .and_then(|m| m.as_str().parse().ok())
    {
        return SpellUses::PerDay(per_day);
    }
    if lower.contains("at will") || lower.contains("at-will") || lower.contains("cantrip") {
        return SpellUses::AtWill;
    }
    SpellUses::Unspecified
}

fn group_level(header: &str) -> Option<u8> {
    if header.to_lowercase().starts_with("cantrip") {
        return Some(0);
    }
    SPELL_GROUP_LEVEL
        .captures(header)
        .and_then(|c| c.name("level"))
        .and_then(|m| m.as_str().parse().ok())
}

fn spellcasting_ability(text: &str) -> Option<Ability> {
    SPELLCASTING_ABILITY.captures_iter(text).find_map(|caps| {
        caps.name("ability1")
            .or_else(|| caps.name("ability2"))
            .and_then(|m| Ability::from_token(m.as_str()))
    })
}

/// Rebuild a feature description as the intro followed by one
/// `header: spell, spell` line per group.
pub fn describe(spellcasting: &Spellcasting, html: bool) -> Option<String> {
    let single_fallback =
        spellcasting.groups.len() == 1 && spellcasting.groups[0].header == spellcasting.title;
    if spellcasting.groups.is_empty() || single_fallback {
        return None;
    }

    let separator = if html { "<br>" } else { "\n" };
    let mut lines = vec![spellcasting.intro.clone()];
    lines.extend(
        spellcasting
            .groups
            .iter()
            .map(|g| format!("{}: {}", g.header, g.spells.join(", "))),
    );
    Some(lines.join(separator))
}
