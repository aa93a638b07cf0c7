//! Status command implementation.
//!
//! Reads the cache only; works without the structural search tool.

use anyhow::{Context, Result};
use std::path::Path;

use crate::engine::{inspect, CacheState};
use crate::symbol::Staleness;

pub fn run(root: &Path, json: bool) -> Result<()> {
    let status = inspect(root);

    if json {
        let out = serde_json::to_string_pretty(&status).context("Failed to serialize status")?;
        println!("{}", out);
        return Ok(());
    }

    println!("Repository: {}", root.display());
    println!("Index path: {}", status.cache_path.display());

    match &status.cache {
        CacheState::Absent => {
            println!("Index: none");
            println!();
            println!("Run 'codeatlas index' to build one.");
            return Ok(());
        }
        CacheState::Corrupted { reason } => {
            println!("Index: corrupted ({})", reason);
            println!("Run 'codeatlas index --force' to rebuild it.");
            return Ok(());
        }
        CacheState::Incompatible { found } => {
            println!("Index: incompatible schema version {:?}", found);
            println!("Run 'codeatlas index --force' to rebuild it.");
            return Ok(());
        }
        CacheState::Loaded => {}
    }

    let languages: Vec<_> = status.languages.iter().map(|l| l.id()).collect();
    println!();
    println!("Index statistics:");
    println!("  Languages: {}", languages.join(", "));
    println!("  Files: {}", status.files);
    println!("  Symbols: {}", status.symbols);
    println!("  Errors: {}", status.errors);
    if let Some(updated) = status.updated {
        println!("  Updated: {}", updated.to_rfc3339());
    }

    println!();
    match &status.staleness {
        Staleness::Fresh => println!("Up to date with HEAD"),
        Staleness::Stale { recorded, current } => {
            println!("Stale: indexed at {}, HEAD is {}", recorded, current);
            println!("Run 'codeatlas update' to catch up.");
        }
        Staleness::Unknown => println!("Staleness unknown (no git metadata)"),
    }
    Ok(())
}
