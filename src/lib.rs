/// Statblock Import - structured records from pasted TTRPG text
///
/// Core library providing statblock and class writeup segmentation,
/// field extraction, and content-library materialization.

pub mod config;
pub mod core;
pub mod error;
pub mod ingestion;

#[cfg(test)]
mod tests;

pub use config::ImporterConfig;
pub use error::{Error, Result};
pub use ingestion::class::{ClassParse, ClassParser, ClassRecord};
pub use ingestion::statblock::{CreatureRecord, StatBlockParse, StatBlockParser};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
