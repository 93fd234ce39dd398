//! Property-based tests for the importer
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! ```sh
//! cargo test property --release
//! ```
//!
//! ## Test Modules
//!
//! - `segmentation_props`: Tests for the line segmenter
//!   - Every kept line lands in exactly one place
//!   - The first content line is always the name
//!   - A hint always wins over classification
//!   - Comment and blank lines are never attributed
//!
//! - `extraction_props`: Tests for the statblock and class parsers
//!   - Parsing never panics on arbitrary text
//!   - Parsing is deterministic
//!   - At most six ability scores
//!   - A well-formed ability row is read back exactly
//!   - Ability modifiers follow floor((score - 10) / 2)
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable.

mod extraction_props;
mod segmentation_props;
