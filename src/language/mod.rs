//! Language detection for repositories.
//!
//! Determines which supported languages are active in a repository so the
//! scanner only enumerates and queries what is actually there.
//!
//! # Detection Algorithm
//!
//! 1. Check the repository root for canonical manifests (`Cargo.toml`,
//!    `go.mod`, `package.json`, ...). This is the fast path.
//! 2. Walk a capped sample of files (500 by default), skipping dependency
//!    caches and hidden directories, and collect distinct extensions.
//! 3. Map extensions back to languages and union both signals.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use codeatlas::language::LanguageDetector;
//!
//! let languages = LanguageDetector::default().detect(Path::new("/home/user/myrepo"));
//! for language in languages {
//!     println!("{}", language);
//! }
//! ```

mod detector;
mod markers;

pub use detector::{LanguageDetector, DEFAULT_SAMPLE_LIMIT};
pub use markers::{Language, LanguageMarker, DEFAULT_MARKERS};
