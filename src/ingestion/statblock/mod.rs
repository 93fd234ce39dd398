//! Creature Statblock Import
//!
//! Turns a pasted creature statblock into a [`CreatureRecord`].
//!
//! # Modules
//!
//! - [`patterns`]: Block ids, the ordered line patterns, and field patterns
//! - [`record`]: The creature record and its value types
//! - [`extractors`]: Header-region field extractors
//! - [`actions`]: Feature and action blocks, per-action mechanics
//! - [`spellcasting`]: Spell group grammars
//! - [`parser`]: [`StatBlockParser`], the entry point
//!
//! # Example
//!
//! ```ignore
//! use crate::ingestion::statblock::{CreatureBlockId, StatBlockParser};
//! use crate::ingestion::segmenter::LineHint;
//!
//! let parser = StatBlockParser::default();
//! let hints = [LineHint::new("Sunlight Sensitivity.", CreatureBlockId::Traits)];
//! if let Some(parsed) = parser.parse(text, &hints) {
//!     println!("{}", parsed.creature.name);
//! }
//! ```

pub mod actions;
pub mod extractors;
pub mod parser;
pub mod patterns;
pub mod record;
pub mod spellcasting;

pub use parser::{StatBlockParse, StatBlockParser};
pub use patterns::{classify, CreatureBlockId, CreatureRegistry};
pub use record::{CreatureRecord, Feature, Spellcasting};
