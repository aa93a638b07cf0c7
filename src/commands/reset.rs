use anyhow::{Context, Result};
use std::path::Path;

use crate::cache::CacheStore;

pub fn run(root: &Path) -> Result<()> {
    let store = CacheStore::new(root);
    if store.reset().context("Failed to delete the cached index")? {
        println!("Deleted {}", store.path().display());
    } else {
        println!("No cached index at {}", store.path().display());
    }
    Ok(())
}
