pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exports;
pub mod git;
pub mod incremental;
pub mod indexer;
pub mod indexing;
pub mod language;
pub mod logging;
pub mod model;
pub mod query;
pub mod scanner;
pub mod symbol;

pub use config::Config;
pub use engine::IndexService;
pub use error::IndexError;
pub use model::RepositoryIndex;
pub use symbol::IndexReader;
