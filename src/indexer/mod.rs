pub mod ignore_rules;
pub mod paths;
pub mod walker;

pub use ignore_rules::IgnoreRules;
pub use paths::{normalize_relative, to_host_path};
pub use walker::{is_statically_excluded, SkippedPath, WalkOutcome, Walker, STATIC_EXCLUSIONS};
