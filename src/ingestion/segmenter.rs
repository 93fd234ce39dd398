//! Block Segmentation
//!
//! Partitions raw input lines into named semantic blocks. A [`BlockRegistry`]
//! supplies the recognition rules (ordered line patterns, which blocks belong to
//! the header region, the unlabeled-features fallback); the segmenter owns the
//! line loop and the transient state that walks it.
//!
//! Every non-empty line that does not start with `*` ends up in exactly one
//! block, or in [`Segmentation::unaccounted`] when no block has opened yet.
//!
//! # Example
//!
//! ```ignore
//! use crate::ingestion::segmenter::segment;
//! use crate::ingestion::statblock::patterns::CreatureRegistry;
//!
//! let registry = CreatureRegistry::default();
//! let segmentation = segment(&registry, text, &[]).expect("non-empty input");
//! for block in segmentation.blocks.values() {
//!     println!("{:?}: {} lines", block.id, block.lines.len());
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

use super::text::combine_lines;

// ============================================================================
// Types
// ============================================================================

/// One input line attributed to a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// Zero-based line index in the original input
    pub line_number: usize,
    /// The trimmed line text
    pub text: String,
    /// Whether a caller-supplied hint forced this line's block
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hinted: bool,
}

/// Character span of a recognized sub-string, for highlighting only.
///
/// Offsets are byte offsets into the block's combined text, or into the
/// numbered line when `line` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub field: String,
    pub line: Option<usize>,
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn new(field: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            field: field.into(),
            line: None,
            start,
            end,
        }
    }

    /// Shift both offsets right by `offset`.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.start += offset;
        self.end += offset;
        self
    }

    pub fn on_line(mut self, line_number: usize) -> Self {
        self.line = Some(line_number);
        self
    }
}

/// A contiguous run of lines belonging to one semantic section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block<Id> {
    pub id: Id,
    pub lines: Vec<SourceLine>,
    /// Presentation-only spans filled in by the extractors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_data: Vec<MatchSpan>,
}

impl<Id> Block<Id> {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            lines: Vec::new(),
            match_data: Vec::new(),
        }
    }

    /// Line texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// All lines joined with single spaces.
    pub fn combined(&self) -> String {
        combine_lines(&self.texts())
    }
}

/// Caller override forcing a line into a specific block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineHint<Id> {
    pub text: String,
    pub block: Id,
}

impl<Id> LineHint<Id> {
    pub fn new(text: impl Into<String>, block: Id) -> Self {
        Self {
            text: text.into(),
            block,
        }
    }
}

/// Result of segmenting one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segmentation<Id: Hash + Eq> {
    /// Blocks in the order they were opened
    pub blocks: IndexMap<Id, Block<Id>>,
    /// Lines seen before any block opened
    pub unaccounted: Vec<SourceLine>,
}

impl<Id: Hash + Eq + Copy> Segmentation<Id> {
    pub fn get(&self, id: Id) -> Option<&Block<Id>> {
        self.blocks.get(&id)
    }

    /// Total lines attributed to blocks plus unaccounted lines.
    pub fn line_count(&self) -> usize {
        self.blocks.values().map(|b| b.lines.len()).sum::<usize>() + self.unaccounted.len()
    }
}

// ============================================================================
// Registry trait
// ============================================================================

/// Recognition rules for one record type.
pub trait BlockRegistry {
    type Id: Copy + Eq + Hash + Debug;

    /// Block that receives the first content line (the record's name).
    fn name_block(&self) -> Self::Id;

    /// First block pattern, in priority order, matching `line` and not in `excluded`.
    fn classify(&self, line: &str, excluded: &[Self::Id]) -> Option<Self::Id>;

    /// Whether an opened block id is withheld from later classification.
    fn excludes_opened(&self) -> bool {
        true
    }

    /// Whether a block belongs to the leading header region.
    fn is_header_block(&self, _id: Self::Id) -> bool {
        false
    }

    /// Unlabeled block to open when an unmatched header-region line looks like
    /// the first feature title.
    fn header_fallback(&self, _line: &str) -> Option<Self::Id> {
        None
    }

    /// Block whose follow-up lines must not re-trigger it.
    fn one_shot(&self) -> Option<Self::Id> {
        None
    }
}

// ============================================================================
// Segmenter
// ============================================================================

/// Transient state threaded through the line loop.
#[derive(Debug, Clone, Copy)]
struct SegmenterState<Id> {
    current: Option<Id>,
    in_header_region: bool,
    one_shot_open: bool,
}

impl<Id: Copy + Eq + Hash + Debug> SegmenterState<Id> {
    fn new() -> Self {
        Self {
            current: None,
            in_header_region: true,
            one_shot_open: false,
        }
    }

    /// Process one non-empty, non-comment line.
    fn advance<R: BlockRegistry<Id = Id>>(
        mut self,
        registry: &R,
        output: &mut Segmentation<Id>,
        source: SourceLine,
        hint: Option<Id>,
    ) -> Self {
        let matched = match hint {
            Some(id) => Some(id),
            None => {
                let excluded: Vec<Id> = if registry.excludes_opened() {
                    output.blocks.keys().copied().collect()
                } else {
                    Vec::new()
                };
                registry.classify(&source.text, &excluded)
            }
        };

        if matched.is_none() && self.in_header_region {
            if let Some(fallback) = registry.header_fallback(&source.text) {
                self.in_header_region = false;
                self.one_shot_open = false;
                self.current = Some(open(output, fallback));
            }
        }

        if let Some(id) = matched {
            self.in_header_region = registry.is_header_block(id);

            let is_one_shot = registry.one_shot() == Some(id);
            if self.one_shot_open && !is_one_shot {
                self.one_shot_open = false;
            }
            if !self.one_shot_open {
                self.current = Some(open(output, id));
                self.one_shot_open = is_one_shot;
            }
        }

        match self.current.and_then(|id| output.blocks.get_mut(&id)) {
            Some(block) => block.lines.push(source),
            None => output.unaccounted.push(source),
        }

        self
    }
}

/// Open a block, reusing it if it already exists.
fn open<Id: Copy + Eq + Hash>(output: &mut Segmentation<Id>, id: Id) -> Id {
    output.blocks.entry(id).or_insert_with(|| Block::new(id));
    id
}

/// Blank lines and `*` comment lines belong to no block.
fn is_content(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('*')
}

/// Segment `text` into blocks. Returns `None` when the input holds no content
/// lines (empty, whitespace-only, or only comments).
pub fn segment<R: BlockRegistry>(
    registry: &R,
    text: &str,
    hints: &[LineHint<R::Id>],
) -> Option<Segmentation<R::Id>> {
    let lines: Vec<&str> = text.lines().collect();
    let name_index = lines.iter().position(|l| is_content(l.trim()))?;

    let mut output = Segmentation {
        blocks: IndexMap::new(),
        unaccounted: Vec::new(),
    };

    let name_block = registry.name_block();
    output.blocks.insert(name_block, Block::new(name_block));
    if let Some(block) = output.blocks.get_mut(&name_block) {
        block.lines.push(SourceLine {
            line_number: name_index,
            text: lines[name_index].trim().to_string(),
            hinted: false,
        });
    }

    let mut state = SegmenterState::new();

    for (line_number, raw) in lines.iter().enumerate().skip(name_index + 1) {
        let line = raw.trim();

        if !is_content(line) {
            continue;
        }

        let hint = hints.iter().find(|h| h.text.trim() == line).map(|h| h.block);
        let source = SourceLine {
            line_number,
            text: line.to_string(),
            hinted: hint.is_some(),
        };

        state = state.advance(registry, &mut output, source, hint);
    }

    if !output.unaccounted.is_empty() {
        log::debug!("Found {} unaccounted-for lines", output.unaccounted.len());
    }

    Some(output)
}

// ============================================================================
// Tests
// ============================================================================
