//! Contract between a synchronised resource and the sync engine

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::Result;
use crate::document::{RemoteUserData, SyncResource};

/// What a synchroniser supports beyond plain sync and apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub supports_merge_preview: bool,
}

/// One pending change shown to the user before a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePreview {
    pub resource: SyncResource,
    pub uri: Url,
    pub has_conflicts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub content: Option<String>,
    pub has_conflicts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptResult {
    pub content: Option<String>,
}

/// What [`Synchroniser::apply`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ApplyOutcome {
    /// Remote slot was empty
    NoRemoteData,
    /// Remote document carried no stored values
    EmptyStorage,
    /// Recorded folders do not belong to this workspace
    NoMatchingFolders,
    /// These keys were written
    Restored { keys: Vec<String> },
}

impl std::fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRemoteData => write!(f, "no remote data"),
            Self::EmptyStorage => write!(f, "remote document has no stored values"),
            Self::NoMatchingFolders => write!(f, "recorded folders do not match this workspace"),
            Self::Restored { keys } => write!(f, "restored {} key(s)", keys.len()),
        }
    }
}

/// Three-way merge operations for resources that support them.
#[async_trait]
pub trait MergeSupport: Send + Sync {
    async fn merge_result(
        &self,
        preview: &ResourcePreview,
        token: &CancellationToken,
    ) -> Result<MergeResult>;

    async fn accept_result(
        &self,
        preview: &ResourcePreview,
        content: Option<&str>,
        token: &CancellationToken,
    ) -> Result<AcceptResult>;
}

/// A resource the sync engine can push and pull.
#[async_trait]
pub trait Synchroniser: Send + Sync {
    fn resource(&self) -> SyncResource;

    fn capabilities(&self) -> Capabilities;

    /// Merge operations, if this resource supports them.
    fn merge_support(&self) -> Option<&dyn MergeSupport> {
        None
    }

    /// Capture local state and publish it.
    ///
    /// Returns the written remote data, or `None` when there was nothing to
    /// publish.
    async fn sync(&self, token: &CancellationToken) -> Result<Option<RemoteUserData>>;

    /// Apply remote data to local state.
    async fn apply(
        &self,
        remote: Option<&RemoteUserData>,
        token: &CancellationToken,
    ) -> Result<ApplyOutcome>;

    async fn preview_changes(
        &self,
        remote: Option<&RemoteUserData>,
        token: &CancellationToken,
    ) -> Result<Vec<ResourcePreview>>;

    /// Whether `remote` differs from what was last synced.
    async fn has_remote_changed(
        &self,
        last_synced: Option<&RemoteUserData>,
        remote: Option<&RemoteUserData>,
    ) -> Result<bool>;

    async fn has_local_data(&self) -> Result<bool>;

    async fn resolve_content(&self, uri: &Url) -> Result<Option<String>>;
}
