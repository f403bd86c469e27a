//! Portable workspace state document and the remote envelope around it

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Format version written by this crate for workspace state documents.
pub const WORKSPACE_STATE_VERSION: u32 = 1;

/// Logical slot in the remote store for a kind of synchronized data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncResource {
    /// Per-workspace key/value state plus folder identities
    WorkspaceState,
}

impl SyncResource {
    /// Get the slot name used in the remote store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkspaceState => "workspaceState",
        }
    }
}

impl std::fmt::Display for SyncResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of one workspace root as recorded at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderIdentity {
    /// URI of the folder on the capturing machine
    pub resource_uri: String,
    /// Resolver-defined identity used for equivalence matching
    pub workspace_folder_identity: String,
}

impl FolderIdentity {
    pub fn new(resource_uri: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            workspace_folder_identity: identity.into(),
        }
    }
}

/// Snapshot of workspace-scoped state.
///
/// Wire shape: `{ "folders": [...], "storage": { "<key>": "<serialized value>" } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceStateDocument {
    /// Ordered folder identities of the capturing workspace
    pub folders: Vec<FolderIdentity>,
    /// Raw serialized values keyed by storage key
    #[serde(default)]
    pub storage: BTreeMap<String, String>,
}

impl WorkspaceStateDocument {
    /// Serialize into the single transport string.
    pub fn to_content(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a transport string written by [`Self::to_content`].
    pub fn from_content(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(malformed)
    }

    /// Parse a transport string that may hold a JSON `null` in place of a
    /// document.
    pub fn from_optional_content(content: &str) -> Result<Option<Self>> {
        serde_json::from_str(content).map_err(malformed)
    }
}

fn malformed(source: serde_json::Error) -> Error {
    Error::MalformedDocument {
        resource: SyncResource::WorkspaceState,
        source,
    }
}

/// Versioned payload stored in a remote slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
    pub content: String,
}

/// What the remote store holds for a slot, together with its version ref.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUserData {
    /// Opaque version/etag assigned by the remote store
    #[serde(rename = "ref")]
    pub ref_: String,
    pub sync_data: Option<SyncData>,
}

impl RemoteUserData {
    /// Content string if the slot holds data.
    pub fn content(&self) -> Option<&str> {
        self.sync_data.as_ref().map(|data| data.content.as_str())
    }
}
