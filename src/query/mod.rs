//! Query catalog: which structural patterns run for each language and
//! category, and how names and import sources are read from their matches.

pub mod catalog;
pub mod extract;

pub use catalog::{dialect_for, queries, Category, Dialect, ExtractionMode, NameFilter, QueryDefinition};
pub use extract::{extract_names, extract_sources};
