//! Search and filter patterns.
//!
//! Compilation and matching ride on the ripgrep core crates (`grep-regex`,
//! `grep-matcher`). A search pattern highlights and jumps; a filter pattern
//! (entered with `&`) hides non-matching lines from navigation and display.
//! Committed patterns accumulate in a browsable history.

pub mod history;
pub mod pattern;

pub use history::{BrowseOutcome, PatternHistory};
pub use pattern::{CasePolicy, CompiledPattern, PatternState};
