// # File State Store
//
// JSON file implementation of StateStore.
//
// ## Behavior
//
// - Missing or unreadable file: empty state, logged (expected on first run)
// - Present but unparseable file (including non-UTF-8 bytes): fatal `StateCorrupt`
// - Writes: serialize to `<file>.tmp`, then rename over the target, so the
//   document is always either the old or the new version in full. A failed
//   write removes the temp file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::config::DEFAULT_STATE_FILE;
use crate::traits::state_store::{PersistedState, StateStore};

/// File-based state store
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::FileStateStore;
/// use ddns_core::traits::{PersistedState, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/ddns/state.json");
///
///     store.save(&PersistedState::new("1.2.3.4", "zid1")).await?;
///     assert_eq!(store.load().await?.last_known_ip, "1.2.3.4");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path`
    ///
    /// Nothing is read or written until `load`/`save` is called.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store at the default file name inside the working directory
    ///
    /// The directory is resolved once, here, so a later `chdir` does not
    /// move the state file.
    pub fn in_working_dir() -> Result<Self, Error> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::config(format!("Failed to get working directory: {}", e)))?;
        Ok(Self::new(cwd.join(DEFAULT_STATE_FILE)))
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    /// Write `json` to the temp file and rename it over the state file
    async fn write_atomically(&self, temp_path: &Path, json: &[u8]) -> Result<(), Error> {
        let mut file = fs::File::create(temp_path).await.map_err(|e| {
            Error::state_persist(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(json).await.map_err(|e| {
            Error::state_persist(format!(
                "Failed to write to temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            Error::state_persist(format!(
                "Failed to sync temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        drop(file);

        fs::rename(temp_path, &self.path).await.map_err(|e| {
            Error::state_persist(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<PersistedState, Error> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    "Could not read saved state from {} ({}). This is expected on first run; \
                     otherwise check file permissions.",
                    self.path.display(),
                    e
                );
                return Ok(PersistedState::default());
            }
        };

        let state: PersistedState = serde_json::from_slice(&content).map_err(|e| {
            Error::StateCorrupt(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            "Loaded state from {}: ip={:?} zone_id={:?}",
            self.path.display(),
            state.last_known_ip,
            state.zone_id
        );
        Ok(state)
    }

    async fn save(&self, state: &PersistedState) -> Result<(), Error> {
        let json = serde_json::to_vec(state)
            .map_err(|e| Error::state_persist(format!("Failed to serialize state: {}", e)))?;

        let temp_path = self.temp_path();
        if let Err(e) = self.write_atomically(&temp_path, &json).await {
            // Best effort; the temp file may never have been created
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }
}
