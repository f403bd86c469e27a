//! Shared fixtures for state-core integration tests

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use state_core::{
    FolderNameIdentity, MemoryRemoteStore, MemoryStateStore, StateStore, StorageScope,
    StorageTarget, SyncContext, WorkspaceIdentityResolver,
};
use state_fs::NormalizedPath;

/// A workspace on one machine: its local store plus the context around it.
pub struct Workspace {
    pub state: Arc<MemoryStateStore>,
    pub ctx: SyncContext,
}

impl Workspace {
    /// Workspace opened on `folders`, sharing `remote` with other workspaces.
    pub fn open(folders: &[&str], remote: &Arc<MemoryRemoteStore>) -> Self {
        let paths: Vec<NormalizedPath> = folders.iter().map(|f| NormalizedPath::new(f)).collect();
        let resolver =
            WorkspaceIdentityResolver::from_paths(&paths, Arc::new(FolderNameIdentity)).unwrap();
        let state = Arc::new(MemoryStateStore::new());
        let ctx = SyncContext::new(state.clone(), remote.clone(), Arc::new(resolver));
        Self { state, ctx }
    }

    /// Put a raw workspace-scoped user value into the local store.
    pub async fn set(&self, key: &str, raw: &str) {
        self.state
            .insert_raw(key, raw, StorageScope::Workspace, StorageTarget::User)
            .await;
    }

    /// Raw workspace value for `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.state.get(key, StorageScope::Workspace).await.unwrap()
    }

    /// Workspace value for `key` parsed as JSON.
    pub async fn value(&self, key: &str) -> Option<Value> {
        self.raw(key)
            .await
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    pub async fn len(&self) -> usize {
        self.state.len(StorageScope::Workspace).await
    }
}

pub fn shared_remote() -> Arc<MemoryRemoteStore> {
    Arc::new(MemoryRemoteStore::new())
}
