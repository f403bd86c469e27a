//! Synchronisation of resources between local state and the remote store
//!
//! This module provides:
//! - **synchroniser**: The contract a resource exposes to the engine
//! - **workspace_state**: Capture, publish and identity-matched restore of workspace state
//! - **engine**: Sequential push/pull driver over registered synchronisers

mod engine;
mod synchroniser;
mod workspace_state;

pub use engine::{SyncEngine, SyncReport};
pub use synchroniser::{
    AcceptResult, ApplyOutcome, Capabilities, MergeResult, MergeSupport, ResourcePreview,
    Synchroniser,
};
pub use workspace_state::{WorkspaceStateSynchroniser, apply, capture, publish};
