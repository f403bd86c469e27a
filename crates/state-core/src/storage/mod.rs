//! Local state store abstraction
//!
//! The store persists string-encoded values per key, partitioned by scope and
//! tagged with a target. Workspace state sync only reads and writes the
//! `(Workspace, User)` partition.

mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Lifetime partition of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    Application,
    Profile,
    Workspace,
}

/// Whether a value belongs to the user (and may roam) or to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTarget {
    User,
    Machine,
}

/// Key/value store holding local state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Keys stored under `scope` with the given `target`, in key order.
    async fn keys(&self, scope: StorageScope, target: StorageTarget) -> Result<Vec<String>>;

    /// Raw string value for `key` in `scope`, regardless of target.
    async fn get(&self, key: &str, scope: StorageScope) -> Result<Option<String>>;

    /// Store a structured value, replacing whatever `key` held before.
    ///
    /// The value is persisted in its JSON-serialized form, so a later
    /// [`StateStore::get`] returns a string that parses back to `value`.
    async fn store(
        &self,
        key: &str,
        value: &Value,
        scope: StorageScope,
        target: StorageTarget,
    ) -> Result<()>;
}

/// A persisted value together with its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub value: String,
    pub target: StorageTarget,
}
