//! Error collection and content hashing shared by full scans and updates

pub mod errors;
pub mod hashing;

pub use errors::{ErrorCollector, ErrorReport, ProcessingStage, ScanErrorRecord};
pub use hashing::{content_hash, hash_files, HashedFile, ScanTarget};
