//! Collaborators shared by synchronisers

use std::sync::Arc;

use crate::identity::IdentityResolver;
use crate::remote::RemoteStore;
use crate::storage::StateStore;

/// Everything a synchroniser talks to, passed in explicitly.
#[derive(Clone)]
pub struct SyncContext {
    pub state: Arc<dyn StateStore>,
    pub remote: Arc<dyn RemoteStore>,
    pub identity: Arc<dyn IdentityResolver>,
    /// Recorded in published data so other machines can tell who wrote it
    pub machine_id: Option<String>,
}

impl SyncContext {
    pub fn new(
        state: Arc<dyn StateStore>,
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            state,
            remote,
            identity,
            machine_id: None,
        }
    }

    pub fn with_machine_id(mut self, machine_id: impl Into<String>) -> Self {
        self.machine_id = Some(machine_id.into());
        self
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("machine_id", &self.machine_id)
            .finish_non_exhaustive()
    }
}
