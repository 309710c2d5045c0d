//! CLI subcommands.

pub mod batch;
pub mod process;

use std::path::Path;

use porec_core::{DataSet, MemoryStore, PorecConfig};

/// Load the reference dataset and wrap it in the in-memory store.
pub fn load_store(data_path: &Path) -> anyhow::Result<MemoryStore> {
    let data = DataSet::from_file(data_path)
        .map_err(|e| anyhow::anyhow!("failed to load dataset {}: {}", data_path.display(), e))?;
    Ok(MemoryStore::new(data))
}

/// Load configuration from the optional `--config` path.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PorecConfig> {
    match config_path {
        Some(path) => Ok(PorecConfig::from_file(Path::new(path))?),
        None => Ok(PorecConfig::default()),
    }
}
