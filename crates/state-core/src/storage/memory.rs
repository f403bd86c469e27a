//! In-memory state store

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{StateStore, StorageScope, StorageTarget, StoredEntry};
use crate::Result;

type Partitions = HashMap<StorageScope, BTreeMap<String, StoredEntry>>;

/// State store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: RwLock<Partitions>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw string value as-is, bypassing JSON serialization.
    pub async fn insert_raw(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        scope: StorageScope,
        target: StorageTarget,
    ) {
        self.entries.write().await.entry(scope).or_default().insert(
            key.into(),
            StoredEntry {
                value: value.into(),
                target,
            },
        );
    }

    /// Number of keys stored under `scope`, across targets.
    pub async fn len(&self, scope: StorageScope) -> usize {
        self.entries
            .read()
            .await
            .get(&scope)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn keys(&self, scope: StorageScope, target: StorageTarget) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
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
        let entries = self.entries.read().await;
        Ok(entries
            .get(&scope)
            .and_then(|partition| partition.get(key))
            .map(|entry| entry.value.clone()))
    }

    async fn store(
        &self,
        key: &str,
        value: &Value,
        scope: StorageScope,
        target: StorageTarget,
    ) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        self.insert_raw(key, serialized, scope, target).await;
        Ok(())
    }
}
