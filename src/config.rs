use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = ".codeatlas";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub indexer: IndexerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Paths or directory names to skip, in addition to the static list
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Dot-directories that should be walked anyway (e.g. ".github")
    #[serde(default)]
    pub include_hidden: Vec<String>,

    /// Honor the repository's .gitignore
    #[serde(default = "default_true")]
    pub respect_ignore_file: bool,

    /// Files inspected when sampling extensions for language detection
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Files passed to one structural-search invocation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Timeout for a multi-file invocation
    #[serde(default = "default_batch_timeout_secs")]
    pub batch_timeout_secs: u64,

    /// Timeout for a single-file invocation
    #[serde(default = "default_file_timeout_secs")]
    pub file_timeout_secs: u64,

    /// Explicit structural-search binary (None = look up ast-grep / sg)
    #[serde(default)]
    pub tool_binary: Option<String>,

    /// Threads used for content hashing (None = auto-detect)
    #[serde(default)]
    pub hash_threads: Option<usize>,

    /// Record skipped subtrees in stats.errors instead of skipping silently
    #[serde(default)]
    pub strict_walk: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            include_hidden: Vec::new(),
            respect_ignore_file: true,
            sample_limit: default_sample_limit(),
            batch_size: default_batch_size(),
            batch_timeout_secs: default_batch_timeout_secs(),
            file_timeout_secs: default_file_timeout_secs(),
            tool_binary: None,
            hash_threads: None,
            strict_walk: false,
        }
    }
}

impl IndexerConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.file_timeout_secs)
    }

    /// Hashing threads, falling back to the CPU count.
    pub fn effective_hash_threads(&self) -> usize {
        self.hash_threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

fn default_true() -> bool {
    true
}

fn default_sample_limit() -> usize {
    500
}

fn default_batch_size() -> usize {
    100
}

fn default_batch_timeout_secs() -> u64 {
    300
}

fn default_file_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rolling files
    #[serde(default)]
    pub enabled: bool,

    /// Also log to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// File log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (relative paths resolve against the repository root)
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Rotation: hourly, daily, minutely, never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: true,
            level: default_log_level(),
            directory: default_log_directory(),
            rotation: default_rotation(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".codeatlas/logs")
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_file_prefix() -> String {
    "codeatlas.log".to_string()
}

impl Config {
    /// Load configuration from the .codeatlas directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .codeatlas directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = Self::state_dir(root);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .codeatlas directory
    pub fn state_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }
}
