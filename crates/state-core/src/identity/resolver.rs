//! Identity resolver over a fixed set of workspace folders

use std::sync::Arc;

use async_trait::async_trait;
use state_fs::NormalizedPath;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::translate::DEFAULT_TRANSLATION_DEPTH;
use super::{IdentityProvider, IdentityResolver, MatchConfidence, UriTranslation};
use crate::document::FolderIdentity;
use crate::{Error, Result};

/// `file` URI for an absolute local folder.
pub fn folder_uri(path: &NormalizedPath) -> Result<Url> {
    Url::from_file_path(path.to_native()).map_err(|()| Error::InvalidUri {
        uri: path.to_string(),
        message: "folder path must be absolute".to_string(),
    })
}

/// Resolves identities of the current workspace folders through an
/// [`IdentityProvider`] and pairs recorded folders with them.
pub struct WorkspaceIdentityResolver {
    folders: Vec<Url>,
    provider: Arc<dyn IdentityProvider>,
    max_depth: usize,
}

impl WorkspaceIdentityResolver {
    pub fn new(folders: Vec<Url>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            folders,
            provider,
            max_depth: DEFAULT_TRANSLATION_DEPTH,
        }
    }

    /// Build a resolver for local folders.
    pub fn from_paths(paths: &[NormalizedPath], provider: Arc<dyn IdentityProvider>) -> Result<Self> {
        let folders = paths.iter().map(folder_uri).collect::<Result<Vec<_>>>()?;
        Ok(Self::new(folders, provider))
    }

    /// Depth limit for the translations this resolver produces.
    pub fn with_translation_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn folders(&self) -> &[Url] {
        &self.folders
    }

    async fn identify_all(&self, token: &CancellationToken) -> Result<Vec<(Url, String)>> {
        let mut identified = Vec::with_capacity(self.folders.len());
        for folder in &self.folders {
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }
            match self.provider.identify(folder).await? {
                Some(identity) => identified.push((folder.clone(), identity)),
                None => debug!(%folder, provider = self.provider.name(), "Folder has no identity"),
            }
        }
        Ok(identified)
    }

    /// Pair each recorded folder with an unused current folder whose identity
    /// reaches `threshold`, preferring the one at the same position.
    fn pair(
        &self,
        current: &[(Url, String)],
        recorded: &[(Url, String)],
        threshold: MatchConfidence,
    ) -> Vec<(Url, Url)> {
        let mut used = vec![false; current.len()];
        let mut pairs = Vec::new();

        for (position, (recorded_uri, recorded_identity)) in recorded.iter().enumerate() {
            let candidate = {
                let accepts = |i: usize| {
                    !used[i] && self.provider.compare(&current[i].1, recorded_identity) >= threshold
                };
                if position < current.len() && accepts(position) {
                    Some(position)
                } else {
                    (0..current.len()).find(|&i| accepts(i))
                }
            };

            if let Some(i) = candidate {
                used[i] = true;
                pairs.push((recorded_uri.clone(), current[i].0.clone()));
            }
        }
        pairs
    }
}

#[async_trait]
impl IdentityResolver for WorkspaceIdentityResolver {
    async fn current_folder_identities(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<FolderIdentity>> {
        Ok(self
            .identify_all(token)
            .await?
            .into_iter()
            .map(|(folder, identity)| FolderIdentity::new(folder.to_string(), identity))
            .collect())
    }

    async fn match_folders(
        &self,
        recorded: &[FolderIdentity],
        token: &CancellationToken,
    ) -> Result<Option<UriTranslation>> {
        let current = self.identify_all(token).await?;

        let recorded: Vec<(Url, String)> = recorded
            .iter()
            .filter_map(|folder| match Url::parse(&folder.resource_uri) {
                Ok(uri) => Some((uri, folder.workspace_folder_identity.clone())),
                Err(e) => {
                    warn!(uri = %folder.resource_uri, error = %e, "Ignoring unparsable recorded folder");
                    None
                }
            })
            .collect();

        for threshold in [MatchConfidence::Complete, MatchConfidence::Partial] {
            let pairs = self.pair(&current, &recorded, threshold);
            if !pairs.is_empty() {
                debug!(?threshold, matched = pairs.len(), recorded = recorded.len(), "Matched recorded folders");
                return Ok(Some(UriTranslation::new(pairs).with_max_depth(self.max_depth)));
            }
        }
        Ok(None)
    }
}
