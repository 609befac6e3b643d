// pricefeed/src/commands/serve.rs
//
// USE CASE: Serve the Query Surface over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{self, AppState};

pub async fn execute(project_dir: PathBuf, addr: SocketAddr) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let connector = super::open_reader(&config).await?;

    println!("🛰️  Serving {} on http://{}", config.database_path, addr);
    api::serve(addr, AppState::new(Arc::new(connector))).await
}
