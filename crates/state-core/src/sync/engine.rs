//! SyncEngine implementation
//!
//! The SyncEngine drives registered synchronisers one after another. Push
//! publishes local state for every resource; pull reads every remote slot
//! and hands it to the owning synchroniser. A failing resource is recorded
//! in the report and the remaining resources still run.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::synchroniser::{MergeResult, Synchroniser};
use super::workspace_state::WorkspaceStateSynchroniser;
use crate::context::SyncContext;
use crate::document::{RemoteUserData, SyncResource};
use crate::remote::RemoteStore;
use crate::{Error, Result};

/// Report from a push or pull
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether every resource completed without error
    pub success: bool,
    /// What was done, one line per resource
    pub actions: Vec<String>,
    /// Errors, prefixed with the resource they came from
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Create a successful sync report
    pub fn success() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Add an action to the report
    pub fn with_action(mut self, action: String) -> Self {
        self.actions.push(action);
        self
    }

    fn record_error(&mut self, resource: SyncResource, err: &Error) {
        error!(%resource, error = %err, "Resource sync failed");
        self.success = false;
        self.errors.push(format!("{resource}: {err}"));
    }
}

/// Sequential driver for synchronisers sharing one remote store.
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    synchronisers: Vec<Arc<dyn Synchroniser>>,
    /// Remote data seen by the last successful push or pull, per resource
    last_synced: Mutex<HashMap<SyncResource, RemoteUserData>>,
}

impl SyncEngine {
    /// Create an engine with no synchronisers registered.
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            synchronisers: Vec::new(),
            last_synced: Mutex::new(HashMap::new()),
        }
    }

    /// Create an engine with every built-in resource registered.
    pub fn for_context(ctx: SyncContext) -> Self {
        let mut engine = Self::new(ctx.remote.clone());
        engine.register(Arc::new(WorkspaceStateSynchroniser::new(ctx)));
        engine
    }

    /// Register a synchroniser, replacing any previous one for its resource.
    pub fn register(&mut self, synchroniser: Arc<dyn Synchroniser>) {
        let resource = synchroniser.resource();
        self.synchronisers.retain(|s| s.resource() != resource);
        self.synchronisers.push(synchroniser);
    }

    pub fn resources(&self) -> Vec<SyncResource> {
        self.synchronisers.iter().map(|s| s.resource()).collect()
    }

    /// Remote data recorded by the last push or pull of `resource`.
    pub async fn last_synced(&self, resource: SyncResource) -> Option<RemoteUserData> {
        self.last_synced.lock().await.get(&resource).cloned()
    }

    /// Publish local state of every resource.
    pub async fn push(&self, token: &CancellationToken) -> SyncReport {
        let mut report = SyncReport::success();

        for synchroniser in &self.synchronisers {
            let resource = synchroniser.resource();
            if token.is_cancelled() {
                report.record_error(resource, &Error::Cancelled);
                continue;
            }

            match synchroniser.sync(token).await {
                Ok(Some(remote)) => {
                    report
                        .actions
                        .push(format!("{resource}: published (ref {})", remote.ref_));
                    self.last_synced.lock().await.insert(resource, remote);
                }
                Ok(None) => report
                    .actions
                    .push(format!("{resource}: nothing to publish")),
                Err(e) => report.record_error(resource, &e),
            }
        }

        info!(success = report.success, actions = report.actions.len(), "Push finished");
        report
    }

    /// Fetch every remote slot and apply it locally.
    pub async fn pull(&self, token: &CancellationToken) -> SyncReport {
        let mut report = SyncReport::success();

        for synchroniser in &self.synchronisers {
            let resource = synchroniser.resource();
            match self.pull_one(synchroniser.as_ref(), token).await {
                Ok(action) => report.actions.push(format!("{resource}: {action}")),
                Err(e) => report.record_error(resource, &e),
            }
        }

        info!(success = report.success, actions = report.actions.len(), "Pull finished");
        report
    }

    async fn pull_one(
        &self,
        synchroniser: &dyn Synchroniser,
        token: &CancellationToken,
    ) -> Result<String> {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let resource = synchroniser.resource();
        let remote = self.remote.read(resource).await?;
        let last = self.last_synced(resource).await;

        if !synchroniser
            .has_remote_changed(last.as_ref(), remote.as_ref())
            .await?
        {
            debug!(%resource, "Remote unchanged since last sync");
            return Ok("up to date".to_string());
        }

        let action = match synchroniser.merge_support() {
            Some(merge) if synchroniser.capabilities().supports_merge_preview => {
                let previews = synchroniser.preview_changes(remote.as_ref(), token).await?;
                for preview in &previews {
                    let merged = merge.merge_result(preview, token).await?;
                    merge
                        .accept_result(preview, merged.content.as_deref(), token)
                        .await?;
                }
                format!("merged {} change(s)", previews.len())
            }
            _ => synchroniser
                .apply(remote.as_ref(), token)
                .await?
                .to_string(),
        };

        if let Some(remote) = remote {
            self.last_synced.lock().await.insert(resource, remote);
        }
        Ok(action)
    }

    /// Compute merge results for `resource` against its current remote data.
    pub async fn merge(
        &self,
        resource: SyncResource,
        token: &CancellationToken,
    ) -> Result<Vec<MergeResult>> {
        let synchroniser = self
            .synchronisers
            .iter()
            .find(|s| s.resource() == resource)
            .ok_or(Error::UnknownResource { resource })?;
        let merge = synchroniser
            .merge_support()
            .ok_or_else(|| Error::unsupported(resource, "merge"))?;

        let remote = self.remote.read(resource).await?;
        let mut results = Vec::new();
        for preview in synchroniser.preview_changes(remote.as_ref(), token).await? {
            results.push(merge.merge_result(&preview, token).await?);
        }
        Ok(results)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("resources", &self.resources())
            .finish_non_exhaustive()
    }
}
