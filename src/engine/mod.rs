//! Orchestration of full scans, incremental updates and status checks.
//!
//! [`IndexService`] is the entry point the command layer drives. It owns
//! the precondition checks (tool present, root readable, references well
//! formed) so that a failed operation never reaches the cache write.

mod service;
mod status;

pub use service::{BuildReport, IndexService, RescanReason, UpdateOutcome};
pub use status::{inspect, CacheState, IndexStatus};
