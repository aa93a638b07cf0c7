//! Ignore-file predicate backed by the `ignore` crate's gitignore matcher.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use tracing::{debug, warn};

const IGNORE_FILE: &str = ".gitignore";

/// `(relative_path, is_dir) -> ignored?` built from the root ignore file.
///
/// When no ignore file exists the predicate is always false.
#[derive(Clone, Default)]
pub struct IgnoreRules {
    matcher: Option<Gitignore>,
}

impl IgnoreRules {
    /// Predicate that never ignores anything.
    pub fn none() -> Self {
        Self { matcher: None }
    }

    /// Parse `<root>/.gitignore` if it exists.
    pub fn load(root: &Path) -> Self {
        let ignore_path = root.join(IGNORE_FILE);
        if !ignore_path.is_file() {
            debug!(root = %root.display(), "No ignore file, nothing is ignored");
            return Self::none();
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(e) = builder.add(&ignore_path) {
            warn!(path = %ignore_path.display(), error = %e, "Partially invalid ignore file");
        }

        match builder.build() {
            Ok(matcher) => Self {
                matcher: Some(matcher),
            },
            Err(e) => {
                warn!(path = %ignore_path.display(), error = %e, "Failed to build ignore matcher");
                Self::none()
            }
        }
    }

    pub fn is_ignored(&self, relative_path: &str, is_dir: bool) -> bool {
        match &self.matcher {
            Some(matcher) => matcher
                .matched(Path::new(relative_path), is_dir)
                .is_ignore(),
            None => false,
        }
    }
}
