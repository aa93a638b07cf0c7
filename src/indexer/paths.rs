//! Repo-relative path normalization.
//!
//! Index keys are always repo-relative with forward slashes, whatever the host
//! separator is.

use std::path::{Component, Path};

/// Normalize a tool- or walker-reported path to a repo-relative key.
///
/// Accepts absolute paths under `root`, `./`-prefixed paths and backslash
/// separators. Returns `None` for paths outside `root`.
pub fn normalize_relative(root: &Path, path: &str) -> Option<String> {
    let unified = path.replace('\\', "/");
    let candidate = Path::new(&unified);

    let relative = if candidate.is_absolute() {
        let root_str = root.to_string_lossy().replace('\\', "/");
        let root_str = root_str.trim_end_matches('/');
        let stripped = unified.strip_prefix(root_str)?;
        if !stripped.is_empty() && !stripped.starts_with('/') {
            return None;
        }
        stripped.trim_start_matches('/').to_string()
    } else {
        unified
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in Path::new(&relative).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Join a repo-relative key with a root, using host separators.
pub fn to_host_path(root: &Path, relative: &str) -> std::path::PathBuf {
    relative
        .split('/')
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}
