//! Remote store abstraction
//!
//! Remote stores keep one versioned payload per [`SyncResource`] slot. Each
//! write replaces the slot and yields a new opaque `ref`.

mod directory;
mod memory;

pub use directory::DirectoryRemoteStore;
pub use memory::MemoryRemoteStore;

use async_trait::async_trait;

use crate::Result;
use crate::document::{RemoteUserData, SyncData, SyncResource};

/// Durable store for synchronized resources.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Current content of the slot, or `None` if it was never written.
    async fn read(&self, resource: SyncResource) -> Result<Option<RemoteUserData>>;

    /// Replace the content of the slot.
    async fn write(&self, resource: SyncResource, data: SyncData) -> Result<RemoteUserData>;
}
