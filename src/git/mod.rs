//! Version-control collaborator: current commit and branch, and the
//! file-level diff between two commits.
//!
//! Everything shells out to `git`. Commit-like strings are validated before
//! they reach a command line.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

use crate::error::IndexError;
use crate::model::GitRef;

lazy_static! {
    static ref COMMIT_SHAPE: Regex =
        Regex::new(r"^[0-9a-fA-F]{7,64}$").expect("Failed to compile COMMIT_SHAPE regex");
}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {args} failed: {stderr}")]
    CommandFailed { args: String, stderr: String },

    #[error("unexpected git output: {0}")]
    InvalidOutput(String),
}

/// Reject anything that is not a plain hex commit hash.
pub fn validate_commit(reference: &str) -> Result<(), IndexError> {
    if COMMIT_SHAPE.is_match(reference) {
        Ok(())
    } else {
        Err(IndexError::InvalidGitReference(reference.to_string()))
    }
}

/// Run `git <args>` in `repo` and return trimmed-right stdout.
fn run_git(repo: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Full hash of `HEAD`.
pub fn current_commit(repo: &Path) -> Result<String, GitError> {
    let hash = run_git(repo, &["rev-parse", "HEAD"])?;
    if COMMIT_SHAPE.is_match(&hash) {
        Ok(hash)
    } else {
        Err(GitError::InvalidOutput(hash))
    }
}

/// Checked-out branch; `None` on a detached head.
pub fn current_branch(repo: &Path) -> Result<Option<String>, GitError> {
    let branch = run_git(repo, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok((!branch.is_empty() && branch != "HEAD").then_some(branch))
}

/// Commit and branch, with failures mapped to `None`.
pub fn git_ref(repo: &Path) -> GitRef {
    let commit = current_commit(repo)
        .map_err(|e| debug!(error = %e, "No git commit available"))
        .ok();
    let branch = current_branch(repo).ok().flatten();
    GitRef { commit, branch }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub kind: ChangeKind,
    /// Repo-relative, as git reports it
    pub path: String,
}

impl FileChange {
    pub fn new(kind: ChangeKind, path: &str) -> Self {
        Self {
            kind,
            path: path.to_string(),
        }
    }
}

/// File-level changes between two commits. A rename becomes a deletion of
/// the old path plus an addition of the new one.
pub fn diff_name_status(repo: &Path, from: &str, to: &str) -> Result<Vec<FileChange>, IndexError> {
    validate_commit(from)?;
    validate_commit(to)?;

    let output = run_git(
        repo,
        &["diff", "--name-status", "-z", "-M", from, to, "--"],
    )?;
    Ok(parse_name_status(&output))
}

/// Parse `git diff --name-status -z` output.
///
/// Records are NUL-separated: a status, then one path (two for renames and
/// copies). Unknown statuses are skipped.
fn parse_name_status(output: &str) -> Vec<FileChange> {
    let mut fields = output.split('\0').filter(|f| !f.is_empty());
    let mut changes = Vec::new();

    while let Some(status) = fields.next() {
        let code = status.chars().next().unwrap_or(' ');
        match code {
            'R' | 'C' => {
                let (Some(old), Some(new)) = (fields.next(), fields.next()) else {
                    break;
                };
                if code == 'R' {
                    changes.push(FileChange::new(ChangeKind::Deleted, old));
                }
                changes.push(FileChange::new(ChangeKind::Added, new));
            }
            _ => {
                let Some(path) = fields.next() else {
                    break;
                };
                let kind = match code {
                    'A' => ChangeKind::Added,
                    'M' | 'T' => ChangeKind::Modified,
                    'D' => ChangeKind::Deleted,
                    _ => {
                        debug!(status, path, "Ignoring unknown diff status");
                        continue;
                    }
                };
                changes.push(FileChange::new(kind, path));
            }
        }
    }
    changes
}
