//! JSON-file backed state store
//!
//! One file holds every scope of one workspace. Each operation reloads the
//! file and writes it back atomically, so readers never see a partial file.
//! Writers hold an exclusive lock on a `<file>.lock` sidecar across the
//! whole load and save, so concurrent processes do not drop each other's
//! keys.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use state_fs::{NormalizedPath, io};
use tokio::sync::Mutex;

use super::{StateStore, StorageScope, StorageTarget, StoredEntry};
use crate::Result;

/// On-disk layout of the state file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateFile {
    /// State file format version
    version: String,
    #[serde(default)]
    scopes: BTreeMap<StorageScope, BTreeMap<String, StoredEntry>>,
}

impl StateFile {
    fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            scopes: BTreeMap::new(),
        }
    }
}

/// State store persisted as a single JSON file.
#[derive(Debug)]
pub struct FileStateStore {
    path: NormalizedPath,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStateStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: NormalizedPath) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn load(&self) -> Result<StateFile> {
        match io::read_text_locked(&self.path)? {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Ok(StateFile::new()),
        }
    }

    fn save(&self, file: &StateFile) -> Result<()> {
        let content = serde_json::to_string_pretty(file)?;
        io::write_text(&self.path, &content)?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn keys(&self, scope: StorageScope, target: StorageTarget) -> Result<Vec<String>> {
        let file = self.load()?;
        Ok(file
            .scopes
            .get(&scope)
            .map(|partition| {
                partition
                    .iter()
                    .filter(|(_, entry)| entry.target == target)
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, key: &str, scope: StorageScope) -> Result<Option<String>> {
        let mut file = self.load()?;
        Ok(file
            .scopes
            .get_mut(&scope)
            .and_then(|partition| partition.remove(key))
            .map(|entry| entry.value))
    }

    async fn store(
        &self,
        key: &str,
        value: &Value,
        scope: StorageScope,
        target: StorageTarget,
    ) -> Result<()> {
        let serialized = serde_json::to_string(value)?;

        let _guard = self.write_lock.lock().await;
        let _lock = io::FileLock::acquire(&self.path)?;
        let mut file = self.load()?;
        file.scopes.entry(scope).or_default().insert(
            key.to_string(),
            StoredEntry {
                value: serialized,
                target,
            },
        );
        self.save(&file)?;

        tracing::trace!(key, path = %self.path, "Stored state value");
        Ok(())
    }
}
