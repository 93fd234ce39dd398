//! Class Writeup Import
//!
//! Turns a class writeup (often pasted markdown) into a [`ClassRecord`]
//! using the same segmenter as statblocks, with header-labeled blocks.

pub mod parser;
pub mod patterns;
pub mod record;

pub use parser::{clean_input, ClassParse, ClassParser};
pub use patterns::{ClassBlockId, ClassRegistry};
pub use record::{ClassFeature, ClassRecord, ClassSpell};
