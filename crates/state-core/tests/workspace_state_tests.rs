//! Tests for capturing, publishing and restoring workspace state

mod common;

use std::sync::Arc;

use common::{Workspace, shared_remote};
use pretty_assertions::assert_eq;
use serde_json::json;
use state_core::sync::{apply, capture, publish};
use state_core::{
    ApplyOutcome, CancellationToken, DirectoryRemoteStore, Error, FileStateStore, FolderIdentity,
    FolderNameIdentity, RemoteStore, RemoteUserData, StateStore, StorageScope, StorageTarget,
    SyncContext, SyncData, SyncResource, Synchroniser, WorkspaceIdentityResolver,
    WorkspaceStateDocument, WorkspaceStateSynchroniser,
};
use state_fs::NormalizedPath;
use tempfile::TempDir;

fn remote_with(document: &WorkspaceStateDocument) -> RemoteUserData {
    RemoteUserData {
        ref_: "1".into(),
        sync_data: Some(SyncData {
            version: 1,
            machine_id: None,
            content: document.to_content().unwrap(),
        }),
    }
}

fn document(folder: &str, identity: &str, storage: &[(&str, &str)]) -> WorkspaceStateDocument {
    WorkspaceStateDocument {
        folders: vec![FolderIdentity::new(folder, identity)],
        storage: storage
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[tokio::test]
async fn test_restore_rewrites_paths_into_current_folder() {
    // [/repo] with foo.bar = {"path":"/repo/x"} restored into [/home/dev/repo]
    let remote = shared_remote();
    let source = Workspace::open(&["/repo"], &remote);
    source.set("foo.bar", r#"{"path":"/repo/x"}"#).await;

    let token = CancellationToken::new();
    let captured = capture(&source.ctx, &token).await.unwrap().unwrap();
    let published = publish(&source.ctx, &captured).await.unwrap();

    let target = Workspace::open(&["/home/dev/repo"], &remote);
    let outcome = apply(&target.ctx, Some(&published), &token).await.unwrap();

    assert_eq!(
        outcome,
        ApplyOutcome::Restored {
            keys: vec!["foo.bar".to_string()]
        }
    );
    assert_eq!(
        target.raw("foo.bar").await.as_deref(),
        Some(r#"{"path":"/home/dev/repo/x"}"#)
    );
}

#[tokio::test]
async fn test_round_trip_into_same_folder_preserves_values() {
    let remote = shared_remote();
    let source = Workspace::open(&["/repo"], &remote);
    source.set("editor.state", r#"{"open":["file:///repo/a.rs"],"zoom":1.5}"#).await;
    source.set("flag", "true").await;
    source.set("name", r#""hello""#).await;

    let sync = WorkspaceStateSynchroniser::new(source.ctx.clone());
    let token = CancellationToken::new();
    let published = sync.sync(&token).await.unwrap().unwrap();

    let target = Workspace::open(&["/repo"], &remote);
    WorkspaceStateSynchroniser::new(target.ctx.clone())
        .apply(Some(&published), &token)
        .await
        .unwrap();

    for key in ["editor.state", "flag", "name"] {
        assert_eq!(target.value(key).await, source.value(key).await, "key {key}");
    }
}

#[tokio::test]
async fn test_absent_remote_data_changes_nothing() {
    let remote = shared_remote();
    let target = Workspace::open(&["/repo"], &remote);
    let token = CancellationToken::new();

    let outcome = apply(&target.ctx, None, &token).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::NoRemoteData);

    let empty_slot = RemoteUserData {
        ref_: "0".into(),
        sync_data: None,
    };
    let outcome = apply(&target.ctx, Some(&empty_slot), &token).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::NoRemoteData);
    assert_eq!(target.len().await, 0);
}

#[tokio::test]
async fn test_empty_storage_changes_nothing() {
    let remote = shared_remote();
    let target = Workspace::open(&["/repo"], &remote);
    target.set("k", "1").await;

    let outcome = apply(
        &target.ctx,
        Some(&remote_with(&document("file:///repo", "repo", &[]))),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ApplyOutcome::EmptyStorage);
    assert_eq!(target.raw("k").await.as_deref(), Some("1"));
    assert_eq!(target.len().await, 1);
}

#[tokio::test]
async fn test_empty_storage_changes_nothing_in_unrelated_workspace() {
    // Empty storage is a no-op whether or not the folders would match
    let remote = shared_remote();
    let target = Workspace::open(&["/home/dev/other"], &remote);
    target.set("k", "1").await;

    let outcome = apply(
        &target.ctx,
        Some(&remote_with(&document("file:///repo", "repo", &[]))),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ApplyOutcome::EmptyStorage);
    assert_eq!(target.raw("k").await.as_deref(), Some("1"));
    assert_eq!(target.len().await, 1);
}

#[tokio::test]
async fn test_unmatched_folders_write_nothing() {
    let remote = shared_remote();
    let target = Workspace::open(&["/home/dev/other"], &remote);
    target.set("k", r#""old""#).await;

    let outcome = apply(
        &target.ctx,
        Some(&remote_with(&document(
            "file:///repo",
            "repo",
            &[("k", r#""new""#), ("extra", "1")],
        ))),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ApplyOutcome::NoMatchingFolders);
    assert_eq!(target.value("k").await, Some(json!("old")));
    assert!(target.raw("extra").await.is_none());
    assert_eq!(target.len().await, 1);
}

#[tokio::test]
async fn test_null_content_is_treated_as_absent() {
    let remote = shared_remote();
    let target = Workspace::open(&["/repo"], &remote);
    target.set("k", "1").await;
    let data = RemoteUserData {
        ref_: "1".into(),
        sync_data: Some(SyncData {
            version: 1,
            machine_id: None,
            content: "null".into(),
        }),
    };

    let outcome = apply(&target.ctx, Some(&data), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, ApplyOutcome::NoRemoteData);
    assert_eq!(target.raw("k").await.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_translation_reaches_every_nesting_level() {
    let remote = shared_remote();
    let target = Workspace::open(&["/home/dev/repo"], &remote);
    let value = json!({
        "top": "file:///repo/a",
        "list": ["/repo/b", {"deep": [{"deeper": "file:///repo/c#L1"}]}],
        "uri": {"$mid": 1, "scheme": "file", "path": "/repo/d", "fsPath": "/repo/d"},
        "other": "/tmp/e"
    });
    let raw = value.to_string();

    apply(
        &target.ctx,
        Some(&remote_with(&document("file:///repo", "repo", &[("k", &raw)]))),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(
        target.value("k").await,
        Some(json!({
            "top": "file:///home/dev/repo/a",
            "list": ["/home/dev/repo/b", {"deep": [{"deeper": "file:///home/dev/repo/c#L1"}]}],
            "uri": {"$mid": 1, "scheme": "file", "authority": "", "path": "/home/dev/repo/d"},
            "other": "/tmp/e"
        }))
    );
}

#[tokio::test]
async fn test_capture_of_workspace_without_folders_publishes_nothing() {
    let remote = shared_remote();
    let empty = Workspace::open(&[], &remote);
    empty.set("k", "1").await;

    let token = CancellationToken::new();
    assert!(capture(&empty.ctx, &token).await.unwrap().is_none());

    let published = WorkspaceStateSynchroniser::new(empty.ctx.clone())
        .sync(&token)
        .await
        .unwrap();
    assert!(published.is_none());
    assert_eq!(remote.write_count().await, 0);
}

#[tokio::test]
async fn test_publish_refuses_document_without_folders() {
    let remote = shared_remote();
    let source = Workspace::open(&["/repo"], &remote);

    let err = publish(&source.ctx, &WorkspaceStateDocument::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoFolders { .. }));
}

#[tokio::test]
async fn test_capture_reads_only_workspace_user_values() {
    let remote = shared_remote();
    let source = Workspace::open(&["/repo"], &remote);
    source.set("kept", "1").await;
    source.set("empty", "").await;
    source
        .state
        .insert_raw("machine", "2", StorageScope::Workspace, StorageTarget::Machine)
        .await;
    source
        .state
        .insert_raw("profile", "3", StorageScope::Profile, StorageTarget::User)
        .await;

    let captured = capture(&source.ctx, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        captured.folders,
        vec![FolderIdentity::new("file:///repo", "repo")]
    );
    assert_eq!(captured.storage.len(), 1);
    assert_eq!(captured.storage.get("kept").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_restore_overwrites_present_keys_only() {
    let remote = shared_remote();
    let target = Workspace::open(&["/repo"], &remote);
    target.set("k1", r#""old""#).await;
    target.set("k2", r#""keep""#).await;

    apply(
        &target.ctx,
        Some(&remote_with(&document("file:///repo", "repo", &[("k1", r#""new""#)]))),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(target.value("k1").await, Some(json!("new")));
    assert_eq!(target.value("k2").await, Some(json!("keep")));
}

#[tokio::test]
async fn test_unparsable_value_fails_after_earlier_keys_were_written() {
    let remote = shared_remote();
    let target = Workspace::open(&["/repo"], &remote);

    let err = apply(
        &target.ctx,
        Some(&remote_with(&document(
            "file:///repo",
            "repo",
            &[("a", "1"), ("b", "not json"), ("c", "3")],
        ))),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        Error::Deserialize { key, .. } => assert_eq!(key, "b"),
        other => panic!("unexpected error: {other}"),
    }
    // Restore is per key, not all-or-nothing
    assert_eq!(target.value("a").await, Some(json!(1)));
    assert!(target.raw("c").await.is_none());
}

#[tokio::test]
async fn test_newer_document_version_is_rejected() {
    let remote = shared_remote();
    let target = Workspace::open(&["/repo"], &remote);
    let mut data = remote_with(&document("file:///repo", "repo", &[("k", "1")]));
    if let Some(sync_data) = data.sync_data.as_mut() {
        sync_data.version = 2;
    }

    let err = apply(&target.ctx, Some(&data), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IncompatibleVersion { found: 2, .. }));
    assert_eq!(target.len().await, 0);
}

#[tokio::test]
async fn test_malformed_document_is_reported() {
    let remote = shared_remote();
    let target = Workspace::open(&["/repo"], &remote);
    let data = RemoteUserData {
        ref_: "1".into(),
        sync_data: Some(SyncData {
            version: 1,
            machine_id: None,
            content: "{".into(),
        }),
    };

    let err = apply(&target.ctx, Some(&data), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { .. }));
}

#[tokio::test]
async fn test_fixed_synchroniser_answers() {
    let remote = shared_remote();
    let sync = WorkspaceStateSynchroniser::new(Workspace::open(&["/repo"], &remote).ctx);
    let token = CancellationToken::new();

    assert_eq!(sync.resource(), SyncResource::WorkspaceState);
    assert!(!sync.capabilities().supports_merge_preview);
    assert!(sync.merge_support().is_none());
    assert!(sync.preview_changes(None, &token).await.unwrap().is_empty());
    assert!(sync.has_remote_changed(None, None).await.unwrap());
    assert!(!sync.has_local_data().await.unwrap());
    let uri = url::Url::parse("file:///repo/x").unwrap();
    assert!(sync.resolve_content(&uri).await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_backed_stores_round_trip() {
    // Two checkouts on disk sharing one remote directory
    let temp = TempDir::new().unwrap();
    let root = NormalizedPath::new(temp.path());
    let remote = Arc::new(DirectoryRemoteStore::new(root.join("remote")));
    let token = CancellationToken::new();

    let open = |folder: &str, state_file: &str| {
        let state = Arc::new(FileStateStore::new(root.join(state_file)));
        let resolver = WorkspaceIdentityResolver::from_paths(
            &[root.join(folder)],
            Arc::new(FolderNameIdentity),
        )
        .unwrap();
        let ctx = SyncContext::new(state.clone(), remote.clone(), Arc::new(resolver))
            .with_machine_id("test-machine");
        (state, ctx)
    };

    let (source_state, source) = open("old/project", "old.json");
    let old_file = format!("{}/src/main.rs", root.join("old/project"));
    source_state
        .store(
            "recent",
            &json!([old_file]),
            StorageScope::Workspace,
            StorageTarget::User,
        )
        .await
        .unwrap();
    WorkspaceStateSynchroniser::new(source).sync(&token).await.unwrap();

    let slot = remote.read(SyncResource::WorkspaceState).await.unwrap().unwrap();
    assert_eq!(
        slot.sync_data.as_ref().and_then(|d| d.machine_id.as_deref()),
        Some("test-machine")
    );

    let (target_state, target) = open("new/project", "new.json");
    let outcome = apply(&target, Some(&slot), &token).await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::Restored { .. }));

    let restored = target_state
        .get("recent", StorageScope::Workspace)
        .await
        .unwrap()
        .unwrap();
    let expected = format!("{}/src/main.rs", root.join("new/project"));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&restored).unwrap(),
        json!([expected])
    );
}
