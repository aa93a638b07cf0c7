//! The structural-search collaborator and its ast-grep CLI implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::config::IndexerConfig;
use crate::error::IndexError;
use crate::query::Dialect;

/// Exit code the tool uses for "ran, found nothing".
const NO_MATCHES_EXIT_CODE: i32 = 1;

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Binaries tried, in order, when none is configured.
const DEFAULT_BINARIES: &[&str] = &["ast-grep", "sg"];

/// One invocation: a pattern over a batch of repo-relative files.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    /// Working directory; `files` are relative to it
    pub root: &'a Path,
    pub pattern: &'a str,
    pub dialect: Dialect,
    pub files: &'a [String],
    pub timeout: Duration,
}

/// An invocation that produced no usable output. Scoped to one batch and
/// pattern; the scan degrades it to zero matches.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("failed to spawn: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runs a structural pattern over files and returns the raw match stream.
#[async_trait]
pub trait StructuralSearch: Send + Sync {
    /// Newline-delimited JSON records; empty when nothing matched.
    async fn run(&self, request: &SearchRequest<'_>) -> Result<String, InvocationError>;

    /// Name shown in logs.
    fn name(&self) -> &str;
}

/// `ast-grep run --pattern P --lang D --json=stream files...`
#[derive(Debug, Clone)]
pub struct AstGrepCli {
    binary: String,
}

impl AstGrepCli {
    /// Use `binary` without probing it.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Resolve a working binary: the configured one, else `ast-grep`, else
    /// `sg` when it identifies itself as ast-grep.
    pub async fn locate(config: &IndexerConfig) -> Result<Self, IndexError> {
        let candidates: Vec<String> = match &config.tool_binary {
            Some(binary) => vec![binary.clone()],
            None => DEFAULT_BINARIES.iter().map(|b| b.to_string()).collect(),
        };

        for candidate in &candidates {
            match query_version(candidate).await {
                Some(version) => {
                    // `sg` is also the name of an unrelated shadow-utils command
                    if candidate == "sg" && !version.to_lowercase().contains("ast-grep") {
                        debug!(binary = %candidate, "Skipping sg: not ast-grep");
                        continue;
                    }
                    debug!(binary = %candidate, version = %version.trim(), "Resolved structural search tool");
                    return Ok(Self::new(candidate.clone()));
                }
                None => debug!(binary = %candidate, "Structural search tool not found"),
            }
        }

        Err(IndexError::ToolUnavailable { tried: candidates })
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

/// `<bin> --version` output, or `None` when it cannot run or fails.
async fn query_version(binary: &str) -> Option<String> {
    let child = Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .ok()?;

    match timeout(VERSION_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            Some(text)
        }
        _ => None,
    }
}

#[async_trait]
impl StructuralSearch for AstGrepCli {
    async fn run(&self, request: &SearchRequest<'_>) -> Result<String, InvocationError> {
        trace!(
            binary = %self.binary,
            dialect = %request.dialect,
            pattern = request.pattern,
            files = request.files.len(),
            "Invoking structural search"
        );

        let child = Command::new(&self.binary)
            .arg("run")
            .arg("--pattern")
            .arg(request.pattern)
            .arg("--lang")
            .arg(request.dialect.as_str())
            .arg("--json=stream")
            .args(request.files)
            .current_dir(request.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the future on timeout drops the child, which kills it
        let output = match timeout(request.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(InvocationError::Timeout(request.timeout)),
        };

        match output.status.code() {
            Some(0) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            Some(NO_MATCHES_EXIT_CODE) => Ok(String::new()),
            code => Err(InvocationError::Failed {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locate_configured_missing_binary() {
        let config = IndexerConfig {
            tool_binary: Some("codeatlas-no-such-binary".to_string()),
            ..Default::default()
        };
        match AstGrepCli::locate(&config).await {
            Err(IndexError::ToolUnavailable { tried }) => {
                assert_eq!(tried, vec!["codeatlas-no-such-binary".to_string()]);
            }
            other => panic!("expected ToolUnavailable, got {:?}", other.map(|t| t.binary)),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_is_invocation_error() {
        let tool = AstGrepCli::new("codeatlas-no-such-binary");
        let dir = tempfile::tempdir().unwrap();
        let files = vec!["a.ts".to_string()];
        let request = SearchRequest {
            root: dir.path(),
            pattern: "function $NAME() {}",
            dialect: Dialect::TypeScript,
            files: &files,
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(tool.run(&request).await, Err(InvocationError::Spawn(_))));
    }
}
