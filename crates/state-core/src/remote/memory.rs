//! In-memory remote store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::RemoteStore;
use crate::Result;
use crate::document::{RemoteUserData, SyncData, SyncResource};

#[derive(Debug, Default)]
struct Slots {
    next_ref: u64,
    data: HashMap<SyncResource, RemoteUserData>,
}

/// Remote store kept in memory with monotonically increasing refs.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    slots: RwLock<Slots>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes performed so far
    pub async fn write_count(&self) -> u64 {
        self.slots.read().await.next_ref
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn read(&self, resource: SyncResource) -> Result<Option<RemoteUserData>> {
        Ok(self.slots.read().await.data.get(&resource).cloned())
    }

    async fn write(&self, resource: SyncResource, data: SyncData) -> Result<RemoteUserData> {
        let mut slots = self.slots.write().await;
        slots.next_ref += 1;
        let remote = RemoteUserData {
            ref_: slots.next_ref.to_string(),
            sync_data: Some(data),
        };
        slots.data.insert(resource, remote.clone());
        Ok(remote)
    }
}
