use std::path::PathBuf;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use crate::errors::ServiceError;

/// In-memory state with an optional JSON snapshot on disk.
///
/// Reads and writes go through closures so callers never hold the lock across
/// their own awaits. `update` closures must check everything they need before
/// touching the state: an `Err` is returned to the caller as-is and nothing is
/// persisted. On a persistent store the closure runs against a copy that only
/// replaces the live state once the snapshot is on disk.
pub struct SnapshotStore<T> {
    inner: RwLock<T>,
    file_path: Option<PathBuf>,
}

impl<T> SnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + Sync,
{
    /// Purely in-memory store; nothing is ever written to disk.
    pub fn in_memory(state: T) -> Arc<Self> {
        Arc::new(Self { inner: RwLock::new(state), file_path: None })
    }

    /// Load the snapshot at `path`, or start empty and create it if missing.
    /// A snapshot that exists but cannot be parsed is an error rather than
    /// something to silently overwrite.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }

        let state: T = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("snapshot {} is unreadable: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = T::default();
                write_snapshot(&file_path, &empty).await?;
                info!(path = %file_path.display(), "created empty snapshot");
                empty
            }
            Err(e) => return Err(ServiceError::storage(e)),
        };

        Ok(Arc::new(Self { inner: RwLock::new(state), file_path: Some(file_path) }))
    }

    pub fn is_persistent(&self) -> bool {
        self.file_path.is_some()
    }

    /// Run `f` against a shared view of the state.
    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let state = self.inner.read().await;
        f(&state)
    }

    /// Apply a mutation and persist. The write lock is held until the
    /// snapshot is on disk so snapshots are written in mutation order.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut T) -> Result<R, ServiceError>,
    ) -> Result<R, ServiceError> {
        let mut state = self.inner.write().await;
        let Some(path) = &self.file_path else {
            return f(&mut state);
        };
        let mut next = state.clone();
        let out = f(&mut next)?;
        write_snapshot(path, &next).await?;
        debug!(path = %path.display(), "snapshot saved");
        *state = next;
        Ok(out)
    }
}

async fn write_snapshot<T: Serialize>(path: &PathBuf, state: &T) -> Result<(), ServiceError> {
    let data = serde_json::to_vec(state).map_err(ServiceError::storage)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).await.map_err(ServiceError::storage)?;
    fs::rename(&tmp, path).await.map_err(ServiceError::storage)?;
    Ok(())
}
