use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use codeatlas::cli::{Cli, Commands};
use codeatlas::config::Config;
use codeatlas::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    // Fall back to defaults on a broken config file
    let config = Config::load(&root).unwrap_or_default();

    // Held until exit so buffered log lines are flushed
    let _logging_guard = init_logging(&config.logging, &root)?;

    tracing::debug!("Repository root: {}", root.display());

    match cli.command {
        Commands::Index { force } => {
            codeatlas::commands::index::run(&root, config, force).await?;
        }
        Commands::Update { target } => {
            codeatlas::commands::update::run(&root, config, target.as_deref()).await?;
        }
        Commands::Status { json } => {
            codeatlas::commands::status::run(&root, json)?;
        }
        Commands::Reset => {
            codeatlas::commands::reset::run(&root)?;
        }
    }

    Ok(())
}
