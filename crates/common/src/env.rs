//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the router is built.

use std::path::Path;

use tracing::{info, warn};

/// Make sure the directory that will hold the store snapshot exists.
///
/// A `None` path means the store runs purely in memory; that is logged so an
/// operator notices data will not survive a restart.
pub async fn ensure_env(snapshot_path: Option<&str>) -> anyhow::Result<()> {
    let Some(path) = snapshot_path else {
        warn!("no snapshot path configured; data lives in memory only");
        return Ok(());
    };
    if let Some(dir) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    }
    info!(%path, "store snapshot enabled");
    Ok(())
}
