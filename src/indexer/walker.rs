use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use super::ignore_rules::IgnoreRules;
use super::paths::normalize_relative;
use crate::config::IndexerConfig;
use crate::language::Language;

/// Directories never walked: VCS internals, dependency and build caches,
/// per-tool state.
pub const STATIC_EXCLUSIONS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "vendor",
    "target",
    "dist",
    "build",
    "out",
    "coverage",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".next",
    ".nuxt",
    ".turbo",
    ".gradle",
    ".idea",
    ".vscode",
    ".codeatlas",
];

/// Whether a single path component is on the static exclusion list.
pub fn is_statically_excluded(component: &str) -> bool {
    STATIC_EXCLUSIONS.contains(&component)
}

/// A subtree or file the walk could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPath {
    pub path: String,
    pub reason: String,
}

/// Files accepted by a walk plus whatever had to be skipped on the way.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<String>,
    pub skipped: Vec<SkippedPath>,
}

/// Walks the repository per language, honoring static and caller
/// exclusions, the ignore file and hidden-directory rules.
pub struct Walker {
    root: PathBuf,
    exclusions: Vec<String>,
    include_hidden: Vec<String>,
    ignore: IgnoreRules,
}

impl Walker {
    /// Create a walker for `root`, loading the ignore file if configured.
    pub fn new(root: PathBuf, config: &IndexerConfig) -> Self {
        let ignore = if config.respect_ignore_file {
            IgnoreRules::load(&root)
        } else {
            IgnoreRules::none()
        };
        Self::with_ignore_rules(root, config, ignore)
    }

    pub fn with_ignore_rules(root: PathBuf, config: &IndexerConfig, ignore: IgnoreRules) -> Self {
        Self {
            root,
            exclusions: config
                .exclude_patterns
                .iter()
                .map(|p| p.replace('\\', "/").trim_matches('/').to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            include_hidden: config.include_hidden.clone(),
            ignore,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All files of `language` under the root, as sorted repo-relative keys.
    ///
    /// Unreadable directories are skipped and reported in `skipped`; the walk
    /// itself never fails.
    pub fn find_files(&self, language: Language) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let extensions = language.extensions();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.keep_entry(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .and_then(|p| normalize_relative(&self.root, &p.to_string_lossy()))
                        .unwrap_or_else(|| ".".to_string());
                    trace!(path = %path, error = %e, "Skipping unreadable path");
                    outcome.skipped.push(SkippedPath {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let matches_language = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if !matches_language {
                continue;
            }

            if let Some(relative) = self.relative_key(entry.path()) {
                outcome.files.push(relative);
            }
        }

        debug!(
            language = %language,
            files = outcome.files.len(),
            skipped = outcome.skipped.len(),
            "Enumerated files"
        );
        outcome
    }

    /// Whether a repo-relative path would be accepted by a walk, checking
    /// every ancestor directory as well as the file itself.
    pub fn accepts(&self, relative: &str) -> bool {
        let parts: Vec<&str> = relative.split('/').collect();
        for depth in 1..parts.len() {
            let dir = parts[..depth].join("/");
            if !self.accepts_dir(&dir, parts[depth - 1]) {
                return false;
            }
        }
        !self.is_excluded(relative) && !self.ignore.is_ignored(relative, false)
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        let Some(relative) = self.relative_key(entry.path()) else {
            return false;
        };
        if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy();
            self.accepts_dir(&relative, &name)
        } else {
            !self.is_excluded(&relative) && !self.ignore.is_ignored(&relative, false)
        }
    }

    fn accepts_dir(&self, relative: &str, name: &str) -> bool {
        if name.starts_with('.') && !self.include_hidden.iter().any(|h| h == name) {
            return false;
        }
        !self.is_excluded(relative) && !self.ignore.is_ignored(relative, true)
    }

    fn is_excluded(&self, relative: &str) -> bool {
        if relative.split('/').any(is_statically_excluded) {
            return true;
        }
        self.exclusions.iter().any(|pattern| {
            relative == pattern
                || relative.starts_with(&format!("{}/", pattern))
                || (!pattern.contains('/') && relative.split('/').any(|c| c == pattern))
        })
    }

    fn relative_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        normalize_relative(&self.root, &relative.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn test_config() -> IndexerConfig {
        IndexerConfig {
            exclude_patterns: vec!["src/generated".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_walker_finds_language_files() {
        let dir = tempdir().unwrap();
        let src_dir = dir.path().join("src");
        fs::create_dir_all(&src_dir).unwrap();

        fs::write(src_dir.join("main.rs"), "fn main() {}").unwrap();
        fs::write(src_dir.join("lib.rs"), "pub fn foo() {}").unwrap();
        fs::write(src_dir.join("readme.md"), "# Readme").unwrap();
        fs::write(dir.path().join("tool.py"), "x = 1").unwrap();

        let walker = Walker::new(dir.path().to_path_buf(), &test_config());
        let outcome = walker.find_files(Language::Rust);

        assert_eq!(outcome.files, vec!["src/lib.rs", "src/main.rs"]);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_walker_static_and_caller_exclusions() {
        let dir = tempdir().unwrap();
        for sub in ["node_modules/pkg", "src/generated", "src/app", "target/debug"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        fs::write(dir.path().join("node_modules/pkg/index.ts"), "").unwrap();
        fs::write(dir.path().join("src/generated/api.ts"), "").unwrap();
        fs::write(dir.path().join("src/app/main.ts"), "").unwrap();
        fs::write(dir.path().join("target/debug/out.ts"), "").unwrap();

        let walker = Walker::new(dir.path().to_path_buf(), &test_config());
        let outcome = walker.find_files(Language::TypeScript);

        assert_eq!(outcome.files, vec!["src/app/main.ts"]);
    }

    #[test]
    fn test_walker_skips_hidden_directories_unless_included() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".github/scripts")).unwrap();
        fs::write(dir.path().join(".github/scripts/release.py"), "").unwrap();
        fs::write(dir.path().join("main.py"), "").unwrap();

        let walker = Walker::new(dir.path().to_path_buf(), &test_config());
        assert_eq!(walker.find_files(Language::Python).files, vec!["main.py"]);

        let mut config = test_config();
        config.include_hidden = vec![".github".to_string()];
        let walker = Walker::new(dir.path().to_path_buf(), &config);
        assert_eq!(
            walker.find_files(Language::Python).files,
            vec![".github/scripts/release.py", "main.py"]
        );
    }

    #[test]
    fn test_walker_respects_ignore_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "scratch/\nlocal_*.go\n").unwrap();
        fs::create_dir_all(dir.path().join("scratch")).unwrap();
        fs::write(dir.path().join("scratch/try.go"), "").unwrap();
        fs::write(dir.path().join("local_debug.go"), "").unwrap();
        fs::write(dir.path().join("main.go"), "").unwrap();

        let walker = Walker::new(dir.path().to_path_buf(), &test_config());
        assert_eq!(walker.find_files(Language::Go).files, vec!["main.go"]);

        let mut config = test_config();
        config.respect_ignore_file = false;
        let walker = Walker::new(dir.path().to_path_buf(), &config);
        assert_eq!(walker.find_files(Language::Go).files.len(), 3);
    }

    #[test]
    fn test_accepts_checks_ancestors() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "tmp/\n").unwrap();

        let walker = Walker::new(dir.path().to_path_buf(), &test_config());
        assert!(walker.accepts("src/app/main.ts"));
        assert!(!walker.accepts("node_modules/x/index.js"));
        assert!(!walker.accepts("src/generated/api.ts"));
        assert!(!walker.accepts(".cache/thing.py"));
        assert!(!walker.accepts("tmp/scratch.go"));
    }
}
