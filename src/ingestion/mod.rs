//! Text Ingestion
//!
//! Pasted statblocks and class writeups go through two stages. The
//! [`segmenter`] splits the text into named blocks of lines; the per-domain
//! parsers in [`statblock`] and [`class`] extract typed fields from those
//! blocks. [`materialize`] then resolves named items against a content
//! library and stores the result.

pub mod assembler;
pub mod class;
pub mod materialize;
pub mod segmenter;
pub mod statblock;
pub mod text;
pub mod vocabulary;

pub use materialize::{ContentCategory, ContentLookup, LibraryItem, Materializer, RecordStore};
pub use segmenter::{segment, BlockRegistry, LineHint, Segmentation};
