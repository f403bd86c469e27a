//! Tests for the SyncEngine

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{Workspace, shared_remote};
use pretty_assertions::assert_eq;
use serde_json::json;
use state_core::sync::{ApplyOutcome, Capabilities, ResourcePreview, Synchroniser};
use state_core::{
    CancellationToken, Error, RemoteUserData, Result, SyncEngine, SyncResource,
    WorkspaceStateSynchroniser,
};
use url::Url;

/// Synchroniser whose every operation fails
struct Broken;

#[async_trait]
impl Synchroniser for Broken {
    fn resource(&self) -> SyncResource {
        SyncResource::WorkspaceState
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn sync(&self, _token: &CancellationToken) -> Result<Option<RemoteUserData>> {
        Err(Error::Cancelled)
    }

    async fn apply(
        &self,
        _remote: Option<&RemoteUserData>,
        _token: &CancellationToken,
    ) -> Result<ApplyOutcome> {
        Err(Error::Cancelled)
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

#[tokio::test]
async fn test_push_then_pull_restores_on_other_machine() {
    let remote = shared_remote();
    let laptop = Workspace::open(&["/work/app"], &remote);
    laptop.set("outline", r#"{"expanded":["/work/app/src"]}"#).await;

    let token = CancellationToken::new();
    let push = SyncEngine::for_context(laptop.ctx.clone()).push(&token).await;
    assert!(push.success, "{:?}", push.errors);
    assert_eq!(push.actions, vec!["workspaceState: published (ref 1)".to_string()]);

    let desktop = Workspace::open(&["/home/me/app"], &remote);
    let engine = SyncEngine::for_context(desktop.ctx.clone());
    let pull = engine.pull(&token).await;

    assert!(pull.success);
    assert_eq!(pull.actions, vec!["workspaceState: restored 1 key(s)".to_string()]);
    assert_eq!(
        desktop.value("outline").await,
        Some(json!({"expanded": ["/home/me/app/src"]}))
    );
    assert_eq!(
        engine
            .last_synced(SyncResource::WorkspaceState)
            .await
            .map(|r| r.ref_),
        Some("1".to_string())
    );
}

#[tokio::test]
async fn test_pull_without_remote_data_reports_it() {
    let remote = shared_remote();
    let workspace = Workspace::open(&["/repo"], &remote);

    let report = SyncEngine::for_context(workspace.ctx.clone())
        .pull(&CancellationToken::new())
        .await;

    assert!(report.success);
    assert_eq!(report.actions, vec!["workspaceState: no remote data".to_string()]);
}

#[tokio::test]
async fn test_pull_applies_every_time() {
    // The resource always reports remote changes, so a second pull applies again
    let remote = shared_remote();
    let source = Workspace::open(&["/repo"], &remote);
    source.set("k", "1").await;
    let token = CancellationToken::new();
    SyncEngine::for_context(source.ctx.clone()).push(&token).await;

    let target = Workspace::open(&["/repo"], &remote);
    let engine = SyncEngine::for_context(target.ctx.clone());
    engine.pull(&token).await;
    target.set("k", "2").await;
    engine.pull(&token).await;

    assert_eq!(target.value("k").await, Some(json!(1)));
}

#[tokio::test]
async fn test_push_of_empty_workspace_is_not_an_error() {
    let remote = shared_remote();
    let workspace = Workspace::open(&[], &remote);

    let report = SyncEngine::for_context(workspace.ctx.clone())
        .push(&CancellationToken::new())
        .await;

    assert!(report.success);
    assert_eq!(report.actions, vec!["workspaceState: nothing to publish".to_string()]);
    assert_eq!(remote.write_count().await, 0);
}

#[tokio::test]
async fn test_failures_are_collected_in_report() {
    let remote = shared_remote();
    let mut engine = SyncEngine::new(remote.clone());
    engine.register(Arc::new(Broken));

    let token = CancellationToken::new();
    let push = engine.push(&token).await;
    assert!(!push.success);
    assert_eq!(push.errors, vec!["workspaceState: Operation cancelled".to_string()]);

    let pull = engine.pull(&token).await;
    assert!(!pull.success);
    assert_eq!(pull.errors.len(), 1);
}

#[tokio::test]
async fn test_register_replaces_same_resource() {
    let remote = shared_remote();
    let workspace = Workspace::open(&["/repo"], &remote);
    let mut engine = SyncEngine::new(remote.clone());
    engine.register(Arc::new(Broken));
    engine.register(Arc::new(WorkspaceStateSynchroniser::new(workspace.ctx.clone())));

    assert_eq!(engine.resources(), vec![SyncResource::WorkspaceState]);
    assert!(engine.push(&CancellationToken::new()).await.success);
}

#[tokio::test]
async fn test_cancelled_push_does_not_publish() {
    let remote = shared_remote();
    let workspace = Workspace::open(&["/repo"], &remote);
    workspace.set("k", "1").await;

    let token = CancellationToken::new();
    token.cancel();
    let report = SyncEngine::for_context(workspace.ctx.clone()).push(&token).await;

    assert!(!report.success);
    assert_eq!(remote.write_count().await, 0);
}

#[tokio::test]
async fn test_merge_is_unsupported_for_workspace_state() {
    let remote = shared_remote();
    let workspace = Workspace::open(&["/repo"], &remote);
    let token = CancellationToken::new();

    let err = SyncEngine::for_context(workspace.ctx.clone())
        .merge(SyncResource::WorkspaceState, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }));
    assert_eq!(err.to_string(), "merge is not supported for workspaceState");

    let err = SyncEngine::new(remote)
        .merge(SyncResource::WorkspaceState, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownResource { .. }));
}
