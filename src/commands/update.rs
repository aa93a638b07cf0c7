//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use super::{print_rescan, spinner};
use crate::config::Config;
use crate::engine::{IndexService, UpdateOutcome};

pub async fn run(root: &Path, config: Config, target: Option<&str>) -> Result<()> {
    let service = IndexService::new(root.to_path_buf(), config)
        .await
        .context("Cannot update without a structural search tool")?;

    let pb = spinner("Applying changes...");
    let outcome = service.update(target).await;
    pb.finish_and_clear();

    match outcome.context("Update failed")? {
        UpdateOutcome::Incremental(summary) => {
            println!(
                "Updated {} -> {}",
                summary.from.as_deref().unwrap_or("?"),
                summary.to.as_deref().unwrap_or("?")
            );
            println!(
                "  added: {}, replaced: {}, removed: {}, unchanged: {}, skipped: {}",
                summary.added, summary.replaced, summary.removed, summary.unchanged, summary.skipped
            );
            println!(
                "  {} invocations, {} errors in {:.2}s",
                summary.invocations,
                summary.errors,
                summary.duration_ms as f64 / 1000.0
            );
        }
        UpdateOutcome::Rescanned { reason, report } => print_rescan(&reason, &report),
        UpdateOutcome::UpToDate { commit } => println!("Index is up to date at {}", commit),
    }
    Ok(())
}
