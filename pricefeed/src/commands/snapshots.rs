// pricefeed/src/commands/snapshots.rs
//
// USE CASE: Audit a store's snapshot history.

use std::path::PathBuf;

use pricefeed_core::domain::snapshot::Stage;
use pricefeed_core::infrastructure::SnapshotStore;

use crate::output::snapshots_table;

pub fn execute(project_dir: PathBuf, stage: Stage) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let root = match stage {
        Stage::Raw => &config.raw_store_path,
        Stage::Clean => &config.clean_store_path,
    };
    let store = SnapshotStore::new(root, stage);
    let entries = store.list()?;

    if entries.is_empty() {
        println!("📭 No {} snapshots in {}", stage, root.display());
        return Ok(());
    }

    println!("📜 {} {} snapshots in {}", entries.len(), stage, root.display());
    println!("{}", snapshots_table(&entries));
    Ok(())
}
