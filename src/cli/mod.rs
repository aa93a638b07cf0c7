use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codeatlas")]
#[command(author, version, about = "Symbol and dependency index for multi-language repositories")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the whole repository and write the index
    Index {
        /// Rescan even if the cached index matches HEAD
        #[arg(short, long)]
        force: bool,
    },

    /// Bring the index up to date with a commit using git diffs
    Update {
        /// Target commit hash (defaults to HEAD)
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Show the state of the cached index
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the cached index
    Reset,
}
