pub mod aggregate;
pub mod bench;
pub mod compare;
pub mod series;
pub mod summary;
pub mod sweep;

use std::path::Path;

use simstats_shared::run::RunStore;
use tracing::info;

pub fn load_run_store(path: &Path) -> anyhow::Result<RunStore> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read run file {}: {}", path.display(), e))?;
    let store = RunStore::from_json_str(&text)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?;
    info!(path = %path.display(), runs = store.len(), "loaded run store");
    Ok(store)
}
