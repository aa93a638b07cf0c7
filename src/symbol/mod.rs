//! Consumer query API.
//!
//! Downstream tools read the cached index through [`IndexReader`]: file
//! listing, per-file records, symbol lookup by name, reverse dependencies
//! and staleness against a commit. Nothing here writes.

pub mod index;
mod resolve;

pub use index::{staleness, IndexReader, Staleness, SymbolRef};
pub use resolve::resolves_to;
