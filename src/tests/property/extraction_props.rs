//! Property-based tests for the statblock and class parsers
//!
//! Tests invariants:
//! - Parsing never panics on arbitrary text
//! - Parsing is deterministic
//! - At most six ability scores
//! - A well-formed ability row is read back exactly
//! - Ability modifiers follow floor((score - 10) / 2)

use proptest::prelude::*;

use crate::config::ImporterConfig;
use crate::ingestion::class::ClassParser;
use crate::ingestion::statblock::StatBlockParser;
use crate::ingestion::vocabulary::Ability;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_score() -> impl Strategy<Value = i32> {
    1i32..=30
}

/// A goblin-shaped statblock with random ability scores and some noise lines
fn arb_statblock() -> impl Strategy<Value = (Vec<i32>, String)> {
    (
        prop::collection::vec(arb_score(), 6),
        prop::collection::vec("[A-Za-z ,.()0-9]{0,30}", 0..5),
    )
        .prop_map(|(scores, noise)| {
            let row = scores
                .iter()
                .map(|s| format!("{s} ({:+})", Ability::modifier(*s)))
                .collect::<Vec<_>>()
                .join(" ");
            let text = format!(
                "Goblin\nSmall humanoid (goblinoid), neutral evil\nArmor Class 15\nHit Points 7 (2d6)\n\
                 Speed 30 ft.\nSTR DEX CON INT WIS CHA\n{row}\nChallenge 1/4 (50 XP)\n{}",
                noise.join("\n")
            );
            (scores, text)
        })
}

/// Arbitrary text drawn from characters that appear in statblocks
fn arb_free_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 \n,.:;()+/*•#-]{0,400}"
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: the creature parser accepts any text
    #[test]
    fn prop_statblock_parse_never_panics(text in arb_free_text()) {
        let parser = StatBlockParser::new(&ImporterConfig::default());
        let parsed = parser.parse(&text, &[]);
        let has_content = text.lines().any(|l| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('*')
        });
        prop_assert_eq!(parsed.is_some(), has_content);
    }

    /// Property: the class parser accepts any text
    #[test]
    fn prop_class_parse_never_panics(text in arb_free_text()) {
        let parsed = ClassParser::new().parse(&text, &[]);
        if let Some(parsed) = parsed {
            prop_assert!(!parsed.class.name.is_empty());
        }
    }

    /// Property: same input, same record
    #[test]
    fn prop_statblock_parse_is_deterministic(text in arb_free_text()) {
        let parser = StatBlockParser::new(&ImporterConfig::default());
        let first = parser.parse(&text, &[]).map(|p| serde_json::to_value(p.creature).unwrap());
        let second = parser.parse(&text, &[]).map(|p| serde_json::to_value(p.creature).unwrap());
        prop_assert_eq!(first, second);
    }

    /// Property: never more than six ability scores
    #[test]
    fn prop_at_most_six_abilities(text in arb_free_text()) {
        let parser = StatBlockParser::new(&ImporterConfig::default());
        if let Some(parsed) = parser.parse(&text, &[]) {
            prop_assert!(parsed.creature.abilities.len() <= 6);
        }
    }

    /// Property: a well-formed ability row is read back exactly
    #[test]
    fn prop_ability_row_round_trips((scores, text) in arb_statblock()) {
        let parser = StatBlockParser::new(&ImporterConfig::default());
        let parsed = parser.parse(&text, &[]).expect("non-empty statblock");
        let read: Vec<i32> = Ability::ALL
            .iter()
            .map(|a| parsed.creature.ability_score(*a).unwrap_or(-1))
            .collect();
        prop_assert_eq!(read, scores);
    }

    /// Property: modifier is floor((score - 10) / 2)
    #[test]
    fn prop_modifier_formula(score in -10i32..=40) {
        let expected = ((score - 10) as f64 / 2.0).floor() as i32;
        prop_assert_eq!(Ability::modifier(score), expected);
    }
}
