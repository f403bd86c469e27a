//! Workspace state resource
//!
//! Outbound, [`capture`] snapshots the `(Workspace, User)` partition of the
//! local store together with the current folder identities and [`publish`]
//! overwrites the remote `workspaceState` slot with it.
//!
//! Inbound, [`apply`] restores a remote snapshot only when the identity
//! resolver pairs its recorded folders with the current workspace. Every
//! value is then parsed, passed through the resulting [`UriTranslation`]
//! and written back under its key. Keys are written one at a time; a
//! failure part way leaves the earlier keys in place.
//!
//! [`UriTranslation`]: crate::identity::UriTranslation

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::synchroniser::{ApplyOutcome, Capabilities, ResourcePreview, Synchroniser};
use crate::context::SyncContext;
use crate::document::{
    RemoteUserData, SyncData, SyncResource, WORKSPACE_STATE_VERSION, WorkspaceStateDocument,
};
use crate::storage::{StorageScope, StorageTarget};
use crate::{Error, Result};

const RESOURCE: SyncResource = SyncResource::WorkspaceState;

/// Snapshot local workspace state.
///
/// Returns `None` when the workspace has no identifiable folders.
#[instrument(skip_all, fields(resource = %RESOURCE))]
pub async fn capture(
    ctx: &SyncContext,
    token: &CancellationToken,
) -> Result<Option<WorkspaceStateDocument>> {
    let folders = ctx.identity.current_folder_identities(token).await?;
    if folders.is_empty() {
        info!("No workspace folders, nothing to capture");
        return Ok(None);
    }

    let mut storage = BTreeMap::new();
    for key in ctx
        .state
        .keys(StorageScope::Workspace, StorageTarget::User)
        .await?
    {
        match ctx.state.get(&key, StorageScope::Workspace).await? {
            Some(value) if !value.is_empty() => {
                storage.insert(key, value);
            }
            _ => debug!(%key, "Skipping key without value"),
        }
    }

    debug!(folders = folders.len(), keys = storage.len(), "Captured workspace state");
    Ok(Some(WorkspaceStateDocument { folders, storage }))
}

/// Overwrite the remote `workspaceState` slot with `document`.
#[instrument(skip_all, fields(resource = %RESOURCE))]
pub async fn publish(ctx: &SyncContext, document: &WorkspaceStateDocument) -> Result<RemoteUserData> {
    if document.folders.is_empty() {
        return Err(Error::NoFolders { resource: RESOURCE });
    }

    let data = SyncData {
        version: WORKSPACE_STATE_VERSION,
        machine_id: ctx.machine_id.clone(),
        content: document.to_content()?,
    };
    let remote = ctx.remote.write(RESOURCE, data).await?;

    info!(
        folders = document.folders.len(),
        keys = document.storage.len(),
        r#ref = %remote.ref_,
        "Published workspace state"
    );
    Ok(remote)
}

/// Restore a remote snapshot into local workspace state.
#[instrument(skip_all, fields(resource = %RESOURCE))]
pub async fn apply(
    ctx: &SyncContext,
    remote: Option<&RemoteUserData>,
    token: &CancellationToken,
) -> Result<ApplyOutcome> {
    let Some(data) = remote.and_then(|remote| remote.sync_data.as_ref()) else {
        info!("Skipping workspace state: no remote data");
        return Ok(ApplyOutcome::NoRemoteData);
    };

    if data.version > WORKSPACE_STATE_VERSION {
        return Err(Error::IncompatibleVersion {
            resource: RESOURCE,
            found: data.version,
            supported: WORKSPACE_STATE_VERSION,
        });
    }

    let Some(document) = WorkspaceStateDocument::from_optional_content(&data.content)? else {
        info!("Skipping workspace state: remote document is empty");
        return Ok(ApplyOutcome::NoRemoteData);
    };
    if document.storage.is_empty() {
        info!("Skipping workspace state: remote document has no stored values");
        return Ok(ApplyOutcome::EmptyStorage);
    }

    let Some(translation) = ctx.identity.match_folders(&document.folders, token).await? else {
        warn!(
            recorded = document.folders.len(),
            "Skipping workspace state: recorded folders do not match this workspace"
        );
        return Ok(ApplyOutcome::NoMatchingFolders);
    };

    let mut keys = Vec::with_capacity(document.storage.len());
    for (key, raw) in document.storage {
        let value: Value = serde_json::from_str(&raw).map_err(|source| Error::Deserialize {
            key: key.clone(),
            source,
        })?;
        let value = translation.translate(value);

        ctx.state
            .store(&key, &value, StorageScope::Workspace, StorageTarget::User)
            .await?;
        debug!(%key, "Restored key");
        keys.push(key);
    }

    info!(keys = keys.len(), machine = ?data.machine_id, "Restored workspace state");
    Ok(ApplyOutcome::Restored { keys })
}

/// [`Synchroniser`] for the `workspaceState` resource.
///
/// Always fully replaces or skips; there is no preview, merge or local
/// content to compare against.
#[derive(Debug, Clone)]
pub struct WorkspaceStateSynchroniser {
    ctx: SyncContext,
}

impl WorkspaceStateSynchroniser {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }
}

#[async_trait]
impl Synchroniser for WorkspaceStateSynchroniser {
    fn resource(&self) -> SyncResource {
        RESOURCE
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_merge_preview: false,
        }
    }

    async fn sync(&self, token: &CancellationToken) -> Result<Option<RemoteUserData>> {
        match capture(&self.ctx, token).await? {
            Some(document) => publish(&self.ctx, &document).await.map(Some),
            None => Ok(None),
        }
    }

    async fn apply(
        &self,
        remote: Option<&RemoteUserData>,
        token: &CancellationToken,
    ) -> Result<ApplyOutcome> {
        apply(&self.ctx, remote, token).await
    }

    async fn preview_changes(
        &self,
        _remote: Option<&RemoteUserData>,
        _token: &CancellationToken,
    ) -> Result<Vec<ResourcePreview>> {
        Ok(Vec::new())
    }

    async fn has_remote_changed(
        &self,
        _last_synced: Option<&RemoteUserData>,
        _remote: Option<&RemoteUserData>,
    ) -> Result<bool> {
        Ok(true)
    }

    async fn has_local_data(&self) -> Result<bool> {
        Ok(false)
    }

    async fn resolve_content(&self, _uri: &Url) -> Result<Option<String>> {
        Ok(None)
    }
}
