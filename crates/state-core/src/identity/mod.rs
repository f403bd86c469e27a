//! Workspace folder identity and recorded-to-current folder matching
//!
//! An [`IdentityResolver`] answers two questions for the restore path: what
//! are the identities of the folders open right now, and do the folders
//! recorded in a remote document correspond to them. A positive answer comes
//! back as a [`UriTranslation`] that moves references from the recorded
//! folders into the current ones.

mod provider;
mod resolver;
mod translate;

pub use provider::{FolderNameIdentity, IdentityProvider, StaticIdentity};
pub use resolver::{WorkspaceIdentityResolver, folder_uri};
pub use translate::{DEFAULT_TRANSLATION_DEPTH, UriTranslation};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::document::FolderIdentity;

/// How strongly two folder identities correspond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchConfidence {
    None,
    Partial,
    Complete,
}

/// Computes folder identities and matches recorded folders against the
/// current workspace.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Identities of the current workspace folders, in workspace order.
    ///
    /// Folders without an identity are left out; an empty result means the
    /// workspace has nothing to capture.
    async fn current_folder_identities(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<FolderIdentity>>;

    /// Match `recorded` against the current folders.
    ///
    /// Returns `None` when no recorded folder corresponds to a current one.
    async fn match_folders(
        &self,
        recorded: &[FolderIdentity],
        token: &CancellationToken,
    ) -> Result<Option<UriTranslation>>;
}
