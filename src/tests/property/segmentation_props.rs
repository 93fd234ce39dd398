//! Property-based tests for the line segmenter
//!
//! Tests invariants:
//! - Every kept line lands in exactly one place
//! - The first content line is always the name
//! - A hint always wins over classification
//! - Comment and blank lines are never attributed

use proptest::prelude::*;

use crate::ingestion::class::{ClassBlockId, ClassRegistry};
use crate::ingestion::segmenter::{segment, LineHint};
use crate::ingestion::statblock::{CreatureBlockId, CreatureRegistry};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Statblock-flavored lines mixed with noise
fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Armor Class 15 (leather armor, shield)".to_string()),
        Just("Hit Points 7 (2d6)".to_string()),
        Just("Speed 30 ft.".to_string()),
        Just("STR DEX CON INT WIS CHA".to_string()),
        Just("8 (-1) 14 (+2) 10 (+0) 10 (+0) 8 (-1) 8 (-1)".to_string()),
        Just("Senses darkvision 60 ft., passive Perception 9".to_string()),
        Just("Languages Common, Goblin".to_string()),
        Just("Challenge 1/4 (50 XP)".to_string()),
        Just("Actions".to_string()),
        Just("Legendary Actions".to_string()),
        Just("Hit Die: d8".to_string()),
        Just("Cantrips: fire bolt, light".to_string()),
        Just("* a comment".to_string()),
        Just("".to_string()),
        "[A-Za-z0-9 ,.:()+/-]{1,40}",
    ]
}

fn arb_text() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_line(), 1..30)
}

fn arb_creature_block() -> impl Strategy<Value = CreatureBlockId> {
    prop::sample::select(CreatureBlockId::ALL.to_vec())
}

/// Line numbers the segmenter should attribute: every non-empty line that
/// is not a comment. The first of them is the name.
fn kept_lines(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('*')
        })
        .map(|(i, _)| i)
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: attributed lines are exactly the kept lines, each once
    #[test]
    fn prop_segmentation_is_a_partition(lines in arb_text()) {
        let text = lines.join("\n");
        let kept = kept_lines(&lines);

        match segment(&CreatureRegistry, &text, &[]) {
            None => prop_assert!(kept.is_empty()),
            Some(seg) => {
                let mut seen: Vec<usize> = seg
                    .blocks
                    .values()
                    .flat_map(|b| b.lines.iter().map(|l| l.line_number))
                    .chain(seg.unaccounted.iter().map(|l| l.line_number))
                    .collect();
                seen.sort_unstable();
                prop_assert_eq!(seen, kept);
            }
        }
    }

    /// Property: the name block opens first and holds the first non-empty line
    #[test]
    fn prop_name_is_first_line(lines in arb_text()) {
        let text = lines.join("\n");
        if let Some(seg) = segment(&ClassRegistry, &text, &[]) {
            let (first_id, first_block) = seg.blocks.first().expect("name block");
            prop_assert_eq!(*first_id, ClassBlockId::Name);
            prop_assert_eq!(first_block.lines[0].line_number, kept_lines(&lines)[0]);
        }
    }

    /// Property: a hinted line lands in the hinted block
    #[test]
    fn prop_hint_always_wins(
        lines in arb_text(),
        pick in any::<prop::sample::Index>(),
        block in arb_creature_block(),
    ) {
        let kept = kept_lines(&lines);
        prop_assume!(kept.len() > 1);

        let target = kept[1 + pick.index(kept.len() - 1)];
        let hinted_text = lines[target].trim().to_string();
        let hints = vec![LineHint::new(hinted_text.clone(), block)];

        let seg = segment(&CreatureRegistry, &lines.join("\n"), &hints).expect("non-empty input");
        let hinted_block = seg.get(block).expect("hinted block opened");
        let placed = hinted_block
            .lines
            .iter()
            .find(|l| l.line_number == target)
            .expect("hinted line in hinted block");
        prop_assert!(placed.hinted);
        prop_assert_eq!(&placed.text, &hinted_text);
    }

    /// Property: whitespace around a line does not change the outcome
    #[test]
    fn prop_indentation_is_ignored(lines in arb_text(), pad in "[ \t]{0,4}") {
        let plain = lines.join("\n");
        let padded = lines
            .iter()
            .map(|l| format!("{pad}{l}{pad}"))
            .collect::<Vec<_>>()
            .join("\n");

        let a = segment(&CreatureRegistry, &plain, &[]);
        let b = segment(&CreatureRegistry, &padded, &[]);
        match (a, b) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                let a_ids: Vec<_> = a.blocks.keys().copied().collect();
                let b_ids: Vec<_> = b.blocks.keys().copied().collect();
                prop_assert_eq!(a_ids, b_ids);
                prop_assert_eq!(a.line_count(), b.line_count());
            }
            _ => prop_assert!(false, "padding changed emptiness"),
        }
    }
}
