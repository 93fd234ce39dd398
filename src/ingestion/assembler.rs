//! Sentence and Paragraph Assembly
//!
//! Rebuilds sentences across wrapped lines and splits a block's prose into
//! (title, body) pairs. Spellcasting text is pulled into its own lane first,
//! because its colon-delimited spell lists do not follow prose punctuation.
//!
//! # Example
//!
//! ```ignore
//! use crate::config::ParserConfig;
//! use crate::ingestion::assembler::assemble;
//!
//! let lines = ["Nimble Escape. The goblin can take the Disengage", "or Hide action as a bonus action."];
//! let pairs = assemble(&lines, &ParserConfig::default());
//! assert_eq!(pairs[0].name, "Nimble Escape");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConsecutiveTitles, ParserConfig};

// ============================================================================
// Types
// ============================================================================

/// A titled section of assembled prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Name of the pair that collects prose before the first title.
pub const DESCRIPTION: &str = "Description";

// ============================================================================
// Regex Patterns
// ============================================================================

/// A short capitalized unit ending in `.` or `!`: a leading word, an optional
/// connector, up to three more words, an optional parenthetical.
static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<title>
            [A-Z][\w\-+,;'’]+[\s\-]?
            (?:(?:of|and|the|from|in|at|on|with|to|by|into)\s)?
            (?:[\w\-+,;'’]+\s?){0,3}
            (?P<paren>\([^)]+\))?
        )[.!]",
    )
    .expect("Failed to compile title regex")
});

static SPELLCASTING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\binnate spellcasting\b|\bspellcasting\b")
        .expect("Failed to compile spellcasting marker regex")
});

/// Check whether text starts with a feature title.
///
/// A parenthetical that opens with "spell save" is a save clause, never part
/// of a title.
pub fn is_title(text: &str) -> bool {
    title_span(text).is_some()
}

/// The matched title text, without its terminal punctuation.
pub fn title_span(text: &str) -> Option<&str> {
    let caps = TITLE.captures(text)?;
    if let Some(paren) = caps.name("paren") {
        if paren.as_str()[1..].to_lowercase().starts_with("spell save") {
            return None;
        }
    }
    caps.name("title").map(|m| m.as_str())
}

// ============================================================================
// Lanes and sentences
// ============================================================================

/// Split block lines into a narrative lane and a spellcasting lane.
///
/// A line mentioning spellcasting starts the spell lane; it closes once the
/// following line looks like a title, with a period appended to the last
/// captured line if missing.
pub fn split_lanes<S: AsRef<str>>(lines: &[S]) -> (Vec<String>, Vec<String>) {
    let valid: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut narrative = Vec::new();
    let mut spells: Vec<String> = Vec::new();
    let mut in_spell_lane = false;

    for (index, line) in valid.iter().enumerate() {
        let mut line = line.to_string();

        if !in_spell_lane {
            in_spell_lane = SPELLCASTING_MARKER.is_match(&line);
            if in_spell_lane && line == "Spellcasting" {
                line.push('.');
            }
        }

        if in_spell_lane {
            spells.push(line);
        } else {
            narrative.push(line);
        }

        let next_is_title = valid.get(index + 1).is_some_and(|next| is_title(next));
        if in_spell_lane && next_is_title {
            if let Some(last) = spells.last_mut() {
                if !last.ends_with('.') {
                    last.push('.');
                }
            }
            in_spell_lane = false;
        }
    }

    (narrative, spells)
}

/// Join lines and split into sentences.
///
/// A line break never ends a sentence. A `.` or `!` does when it is followed by
/// whitespace and a character that is not lowercase, or by the end of text.
pub fn make_sentences<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let text = lines
        .iter()
        .flat_map(|l| l.as_ref().split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if c != '.' && c != '!' {
            continue;
        }

        let boundary = match chars.get(i + 1) {
            None => true,
            Some(&(_, ' ')) => chars.get(i + 2).map_or(true, |&(_, after)| !after.is_lowercase()),
            Some(_) => false,
        };

        if boundary {
            let end = pos + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

// ============================================================================
// Assembler
// ============================================================================

struct Pair {
    name: String,
    raw_title: String,
    value: Option<String>,
}

fn strip_terminal(sentence: &str) -> &str {
    sentence
        .strip_suffix('.')
        .or_else(|| sentence.strip_suffix('!'))
        .unwrap_or(sentence)
}

fn append(value: &mut Option<String>, sentence: &str) {
    match value {
        Some(existing) if !existing.is_empty() => {
            existing.push(' ');
            existing.push_str(sentence);
        }
        _ => *value = Some(sentence.to_string()),
    }
}

/// Assemble block lines into ordered (title, body) pairs.
pub fn assemble<S: AsRef<str>>(lines: &[S], config: &ParserConfig) -> Vec<NameValue> {
    let (narrative, spells) = split_lanes(lines);
    let mut sentences = make_sentences(&narrative);
    sentences.extend(make_sentences(&spells));

    let mut pairs: Vec<Pair> = Vec::new();
    let mut previous_was_title = false;

    for (index, sentence) in sentences.iter().enumerate() {
        // A title can't be the last sentence
        let looks_like_title = index + 1 < sentences.len() && is_title(sentence);
        let opens = looks_like_title
            && (!previous_was_title || config.consecutive_titles == ConsecutiveTitles::OpenBoth);

        if opens {
            previous_was_title = true;
            pairs.push(Pair {
                name: strip_terminal(sentence).to_string(),
                raw_title: sentence.clone(),
                value: None,
            });
            continue;
        }

        previous_was_title = false;
        match pairs.last_mut() {
            Some(pair) => append(&mut pair.value, sentence),
            None => pairs.push(Pair {
                name: DESCRIPTION.to_string(),
                raw_title: String::new(),
                value: Some(sentence.clone()),
            }),
        }
    }

    // Fold body-less pairs into their predecessor as a continuation phrase.
    let mut merged: Vec<Pair> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match (pair.value.is_none(), merged.last_mut()) {
            (true, Some(previous)) => append(&mut previous.value, &pair.raw_title),
            _ => merged.push(pair),
        }
    }

    merged
        .into_iter()
        .map(|pair| {
            let value = pair.value.unwrap_or_default();
            NameValue::new(pair.name, format_for_display(&value, config.html_paragraphs))
        })
        .collect()
}

/// Break bullet-separated text into paragraphs.
pub fn format_for_display(text: &str, html: bool) -> String {
    let expanded = text.replace('•', "\n•");
    let parts: Vec<&str> = expanded.split('\n').collect();

    if parts.len() > 1 && html {
        format!("<p>{}</p>", parts.join("</p><p>"))
    } else {
        parts.join("\n")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_both() -> ParserConfig {
        ParserConfig {
            consecutive_titles: ConsecutiveTitles::OpenBoth,
            ..ParserConfig::default()
        }
    }

    // ========================================================================
    // Title pattern
    // ========================================================================

    #[test]
    fn test_title_pattern() {
        assert!(is_title("Nimble Escape. The goblin can take"));
        assert!(is_title("Keen Hearing and Smell."));
        assert!(is_title("Fire Breath (Recharge 5–6)."));
        assert!(is_title("Legendary Resistance (3/Day)."));
        assert!(!is_title("the goblin hides."));
        assert!(!is_title("Melee Weapon Attack: +4 to hit."));
        assert!(!is_title("A."));
    }

    #[test]
    fn test_spell_save_parenthetical_is_not_title() {
        assert!(!is_title("Innate Spellcasting (spell save DC 13)."));
        assert!(is_title("Innate Spellcasting (Psionics)."));
        assert_eq!(title_span("Fire Breath (Recharge 5–6). The"), Some("Fire Breath (Recharge 5–6)"));
    }

    // ========================================================================
    // Sentences
    // ========================================================================

    #[test]
    fn test_sentences_span_line_breaks() {
        let lines = ["Pack Tactics. The wolf has advantage on an", "attack roll against a creature."];
        let sentences = make_sentences(&lines);
        assert_eq!(
            sentences,
            vec!["Pack Tactics.", "The wolf has advantage on an attack roll against a creature."]
        );
    }

    #[test]
    fn test_abbreviation_before_lowercase_does_not_split() {
        let sentences = make_sentences(&["reach 5 ft. one target. Hit: 5 damage."]);
        assert_eq!(sentences, vec!["reach 5 ft. one target.", "Hit: 5 damage."]);
    }

    #[test]
    fn test_unterminated_tail_is_a_sentence() {
        let sentences = make_sentences(&["Bite. Melee Weapon Attack: +4 to hit"]);
        assert_eq!(sentences, vec!["Bite.", "Melee Weapon Attack: +4 to hit"]);
    }

    // ========================================================================
    // Lanes
    // ========================================================================

    #[test]
    fn test_spell_lane_isolated_until_next_title() {
        let lines = [
            "Spellcasting",
            "The mage is a 9th-level spellcaster.",
            "At will: fire bolt, light",
            "Nimble Escape. The mage slips away.",
        ];
        let (narrative, spells) = split_lanes(&lines);
        assert_eq!(narrative, vec!["Nimble Escape. The mage slips away."]);
        assert_eq!(
            spells,
            vec!["Spellcasting.", "The mage is a 9th-level spellcaster.", "At will: fire bolt, light."]
        );
    }

    #[test]
    fn test_spell_lane_follows_narrative_in_output() {
        let lines = [
            "Innate Spellcasting. The imp can cast",
            "At will: invisibility",
            "Devil's Sight. Magical darkness doesn't impede the imp's darkvision.",
        ];
        let pairs = assemble(&lines, &ParserConfig::default());
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].name, "Devil's Sight");
        assert_eq!(pairs[1].name, "Innate Spellcasting");
        assert_eq!(pairs[1].value, "The imp can cast At will: invisibility.");
    }

    // ========================================================================
    // Pairing
    // ========================================================================

    #[test]
    fn test_prose_before_title_is_description() {
        let pairs = assemble(
            &["The goblin is a small and sneaky creature.", "Nimble Escape. It hides as a bonus action."],
            &ParserConfig::default(),
        );
        assert_eq!(pairs[0], NameValue::new(DESCRIPTION, "The goblin is a small and sneaky creature."));
        assert_eq!(pairs[1], NameValue::new("Nimble Escape", "It hides as a bonus action."));
    }

    #[test]
    fn test_two_titles_second_is_body() {
        let pairs = assemble(&["Bite. Multiattack."], &ParserConfig::default());
        assert_eq!(pairs, vec![NameValue::new("Bite", "Multiattack.")]);

        let pairs = assemble(&["Bite. Multiattack. The dog bites twice."], &ParserConfig::default());
        assert_eq!(pairs, vec![NameValue::new("Bite", "Multiattack. The dog bites twice.")]);
    }

    #[test]
    fn test_two_titles_open_both_folds_empty_pair() {
        let pairs = assemble(&["Claws. Rend Armor. The beast tears."], &open_both());
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], NameValue::new("Claws", ""));
        assert_eq!(pairs[1], NameValue::new("Rend Armor", "The beast tears."));

        let pairs = assemble(&["Bite. It bites hard with fangs. Claw.", "Tail. It swipes."], &open_both());
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], NameValue::new("Bite", "It bites hard with fangs. Claw."));
        assert_eq!(pairs[1], NameValue::new("Tail", "It swipes."));
    }

    #[test]
    fn test_bullets_become_paragraphs() {
        let pairs = assemble(&["Options. Choose one: • Fire • Ice"], &ParserConfig::default());
        assert_eq!(pairs[0].value, "<p>Choose one: </p><p>• Fire </p><p>• Ice</p>");

        assert_eq!(format_for_display("One • Two", false), "One \n• Two");
        assert_eq!(format_for_display("Plain text.", true), "Plain text.");
    }

    #[test]
    fn test_empty_input() {
        assert!(assemble::<&str>(&[], &ParserConfig::default()).is_empty());
    }
}
