//! Directory-backed remote store
//!
//! Each slot is a JSON file `<dir>/<slot>.json`. The ref of a slot is the
//! checksum of its payload content, so identical content yields the same ref.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use state_fs::checksum::compute_content_checksum;
use state_fs::{NormalizedPath, io};

use super::RemoteStore;
use crate::Result;
use crate::document::{RemoteUserData, SyncData, SyncResource};

/// On-disk record for one slot
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotRecord {
    /// When the slot was last written
    updated: DateTime<Utc>,
    data: SyncData,
}

/// Remote store persisted in a local (or mounted) directory.
#[derive(Debug, Clone)]
pub struct DirectoryRemoteStore {
    dir: NormalizedPath,
}

impl DirectoryRemoteStore {
    pub fn new(dir: NormalizedPath) -> Self {
        Self { dir }
    }

    /// Path of the file holding `resource`
    pub fn slot_path(&self, resource: SyncResource) -> NormalizedPath {
        self.dir.join(&format!("{}.json", resource.as_str()))
    }

    /// When `resource` was last written, if ever.
    pub fn last_updated(&self, resource: SyncResource) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load(resource)?.map(|record| record.updated))
    }

    fn load(&self, resource: SyncResource) -> Result<Option<SlotRecord>> {
        match io::read_text_locked(&self.slot_path(resource))? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RemoteStore for DirectoryRemoteStore {
    async fn read(&self, resource: SyncResource) -> Result<Option<RemoteUserData>> {
        Ok(self.load(resource)?.map(|record| RemoteUserData {
            ref_: compute_content_checksum(&record.data.content),
            sync_data: Some(record.data),
        }))
    }

    async fn write(&self, resource: SyncResource, data: SyncData) -> Result<RemoteUserData> {
        let record = SlotRecord {
            updated: Utc::now(),
            data,
        };
        let path = self.slot_path(resource);
        io::write_text(&path, &serde_json::to_string_pretty(&record)?)?;
        tracing::debug!(%resource, path = %path, "Wrote remote slot");

        Ok(RemoteUserData {
            ref_: compute_content_checksum(&record.data.content),
            sync_data: Some(record.data),
        })
    }
}
