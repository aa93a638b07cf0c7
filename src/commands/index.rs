//! Index command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use super::{print_rescan, spinner};
use crate::config::Config;
use crate::engine::{IndexService, UpdateOutcome};

/// Run the index command.
///
/// # Arguments
///
/// * `force` - Rescan even when the cached index already matches `HEAD`
pub async fn run(root: &Path, config: Config, force: bool) -> Result<()> {
    let service = IndexService::new(root.to_path_buf(), config)
        .await
        .context("Cannot index without a structural search tool")?;

    let pb = spinner("Scanning repository...");
    let outcome = service.ensure_indexed(force).await;
    pb.finish_and_clear();

    match outcome.context("Indexing failed")? {
        UpdateOutcome::UpToDate { commit } => {
            println!("Index is up to date at {}", commit);
        }
        UpdateOutcome::Rescanned { reason, report } => print_rescan(&reason, &report),
        UpdateOutcome::Incremental(summary) => {
            println!("Updated {} files", summary.changed_files());
        }
    }
    println!("Index: {}", service.store().path().display());
    Ok(())
}
