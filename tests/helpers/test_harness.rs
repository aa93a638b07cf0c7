use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

use codeatlas::cache::CacheStore;
use codeatlas::{Config, IndexService};

use super::scripted_tool::ScriptedTool;

pub struct TestHarness {
    pub temp_dir: TempDir,
    pub config: Config,
    pub tool: Arc<ScriptedTool>,
}

impl TestHarness {
    pub fn new(tool: ScriptedTool) -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            config: Config::default(),
            tool: Arc::new(tool),
        })
    }

    pub fn create_test_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    pub fn remove_test_file(&self, path: &str) -> Result<()> {
        std::fs::remove_file(self.temp_dir.path().join(path))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn service(&self) -> IndexService {
        IndexService::with_tool(
            self.path().to_path_buf(),
            self.config.clone(),
            self.tool.clone(),
        )
    }

    pub fn store(&self) -> CacheStore {
        CacheStore::new(self.path())
    }

    /// Run git in the test repository.
    pub fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(["-c", "user.name=codeatlas", "-c", "user.email=codeatlas@example.com"])
            .args(args)
            .current_dir(self.path())
            .output()?;
        if !output.status.success() {
            bail!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn init_repo(&self) -> Result<()> {
        self.git(&["init", "-q"])?;
        self.git(&["symbolic-ref", "HEAD", "refs/heads/main"])?;
        Ok(())
    }

    /// Stage everything and commit. Returns the new commit hash.
    pub fn commit_all(&self, message: &str) -> Result<String> {
        self.git(&["add", "-A"])?;
        self.git(&["commit", "-q", "--allow-empty", "-m", message])?;
        self.git(&["rev-parse", "HEAD"])
    }
}

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
