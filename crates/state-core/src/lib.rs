//! Workspace state synchronization
//!
//! Captures the workspace-scoped user state of the local store together with
//! the identities of the open workspace folders, publishes it to a remote
//! slot, and restores it on another machine or checkout once the recorded
//! folders are matched to local ones. References to recorded folders inside
//! the stored values are rewritten to point at the matching local folders.
//!
//! # Architecture
//!
//! - [`storage`]: Local key/value state store
//! - [`remote`]: Remote slot store
//! - [`identity`]: Folder identities, matching and URI translation
//! - [`sync`]: Synchroniser contract, workspace state pipeline and engine
//! - [`config`]: Configuration file handling

pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod identity;
pub mod logging;
pub mod remote;
pub mod storage;
pub mod sync;

pub use config::{IdentityConfig, IdentityStrategy, SyncConfig};
pub use context::SyncContext;
pub use document::{
    FolderIdentity, RemoteUserData, SyncData, SyncResource, WORKSPACE_STATE_VERSION,
    WorkspaceStateDocument,
};
pub use error::{Error, Result};
pub use identity::{
    FolderNameIdentity, IdentityProvider, IdentityResolver, MatchConfidence, StaticIdentity,
    UriTranslation, WorkspaceIdentityResolver,
};
pub use remote::{DirectoryRemoteStore, MemoryRemoteStore, RemoteStore};
pub use storage::{FileStateStore, MemoryStateStore, StateStore, StorageScope, StorageTarget};
pub use sync::{ApplyOutcome, SyncEngine, SyncReport, Synchroniser, WorkspaceStateSynchroniser};

pub use tokio_util::sync::CancellationToken;
