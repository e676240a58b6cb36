//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the snapshot directory exists when persistence is enabled.
pub async fn ensure_env(snapshot_path: Option<&str>) -> anyhow::Result<()> {
    common::env::ensure_env(snapshot_path).await
}
