//! Key-value backends for the persisted wallet marker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use walletsync_core::{PortError, StoragePort};

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, PortError> {
        self.entries
            .lock()
            .map_err(|e| PortError::Transport(format!("storage lock poisoned: {e}")))
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PortError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PortError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use tracing::{debug, info};
    use walletsync_core::{PortError, StoragePort};

    /// JSON object on disk, rewritten on every change.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
        write_lock: Arc<Mutex<()>>,
    }

    impl FileStorage {
        pub fn new(path: impl AsRef<Path>) -> Self {
            let path = path.as_ref().to_path_buf();
            info!("using storage file {}", path.display());
            Self {
                path,
                write_lock: Arc::new(Mutex::new(())),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn load(&self) -> Result<BTreeMap<String, String>, PortError> {
            match std::fs::read(&self.path) {
                Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
                Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                    PortError::Validation(format!(
                        "corrupt storage file {}: {e}",
                        self.path.display()
                    ))
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
                Err(e) => Err(PortError::Transport(format!(
                    "read {} failed: {e}",
                    self.path.display()
                ))),
            }
        }

        fn update<F>(&self, change: F) -> Result<(), PortError>
        where
            F: FnOnce(&mut BTreeMap<String, String>),
        {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|e| PortError::Transport(format!("storage lock poisoned: {e}")))?;
            let mut entries = self.load()?;
            change(&mut entries);
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        PortError::Transport(format!("create {} failed: {e}", parent.display()))
                    })?;
                }
            }
            let bytes = serde_json::to_vec_pretty(&entries)
                .map_err(|e| PortError::Validation(format!("encode storage failed: {e}")))?;
            std::fs::write(&self.path, bytes).map_err(|e| {
                PortError::Transport(format!("write {} failed: {e}", self.path.display()))
            })
        }
    }

    impl StoragePort for FileStorage {
        #[tracing::instrument(level = "debug", skip(self))]
        fn get(&self, key: &str) -> Result<Option<String>, PortError> {
            Ok(self.load()?.get(key).cloned())
        }

        #[tracing::instrument(level = "debug", skip(self))]
        fn set(&self, key: &str, value: &str) -> Result<(), PortError> {
            self.update(|entries| {
                entries.insert(key.to_owned(), value.to_owned());
            })
        }

        #[tracing::instrument(level = "debug", skip(self))]
        fn remove(&self, key: &str) -> Result<(), PortError> {
            if !self.path.exists() {
                debug!("nothing stored yet");
                return Ok(());
            }
            self.update(|entries| {
                entries.remove(key);
            })
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use walletsync_core::{PortError, StoragePort};

    /// `window.localStorage`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserStorage;

    fn local_storage() -> Result<web_sys::Storage, PortError> {
        web_sys::window()
            .ok_or_else(|| PortError::Transport("missing window".to_owned()))?
            .local_storage()
            .map_err(|e| PortError::Transport(format!("localStorage unavailable: {e:?}")))?
            .ok_or_else(|| PortError::NotFound("localStorage missing".to_owned()))
    }

    impl StoragePort for BrowserStorage {
        fn get(&self, key: &str) -> Result<Option<String>, PortError> {
            local_storage()?
                .get_item(key)
                .map_err(|e| PortError::Transport(format!("localStorage get failed: {e:?}")))
        }

        fn set(&self, key: &str, value: &str) -> Result<(), PortError> {
            local_storage()?
                .set_item(key, value)
                .map_err(|e| PortError::Transport(format!("localStorage set failed: {e:?}")))
        }

        fn remove(&self, key: &str) -> Result<(), PortError> {
            local_storage()?
                .remove_item(key)
                .map_err(|e| PortError::Transport(format!("localStorage remove failed: {e:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        storage.set("WALLET_ID", "injected").expect("set");
        assert_eq!(view.get("WALLET_ID").expect("get").as_deref(), Some("injected"));
        view.remove("WALLET_ID").expect("remove");
        assert_eq!(storage.get("WALLET_ID").expect("get"), None);
        storage.remove("WALLET_ID").expect("remove missing");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_storage_persists_across_instances() {
        let path = std::env::temp_dir().join(format!(
            "walletsync-storage-{}-{:?}.json",
            std::process::id(),
            std::thread::current().id()
        ));
        let _ = std::fs::remove_file(&path);

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("WALLET_ID").expect("empty get"), None);
        storage.remove("WALLET_ID").expect("remove before write");
        storage.set("WALLET_ID", "walletConnect").expect("set");

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get("WALLET_ID").expect("get").as_deref(),
            Some("walletConnect")
        );
        reopened.remove("WALLET_ID").expect("remove");
        assert_eq!(storage.get("WALLET_ID").expect("get"), None);

        let _ = std::fs::remove_file(&path);
    }
}
