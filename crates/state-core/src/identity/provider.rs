//! Folder identity providers

use std::collections::HashMap;

use async_trait::async_trait;
use state_fs::NormalizedPath;
use url::Url;

use super::MatchConfidence;
use crate::Result;

/// Source of folder identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &str;

    /// Identity of `folder`, or `None` if it has none.
    async fn identify(&self, folder: &Url) -> Result<Option<String>>;

    /// Compare the identity of a current folder with a recorded one.
    fn compare(&self, current: &str, recorded: &str) -> MatchConfidence {
        if current == recorded {
            MatchConfidence::Complete
        } else {
            MatchConfidence::None
        }
    }
}

/// Identifies a folder by its last path segment.
///
/// Same name is a complete match; names differing only in ASCII case are a
/// partial match.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderNameIdentity;

#[async_trait]
impl IdentityProvider for FolderNameIdentity {
    fn name(&self) -> &str {
        "folder-name"
    }

    async fn identify(&self, folder: &Url) -> Result<Option<String>> {
        let Some(segment) = folder
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        else {
            return Ok(None);
        };

        let name = match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        };
        Ok(Some(name))
    }

    fn compare(&self, current: &str, recorded: &str) -> MatchConfidence {
        if current == recorded {
            MatchConfidence::Complete
        } else if current.eq_ignore_ascii_case(recorded) {
            MatchConfidence::Partial
        } else {
            MatchConfidence::None
        }
    }
}

/// Identities assigned explicitly per local folder.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    identities: HashMap<NormalizedPath, String>,
}

impl StaticIdentity {
    pub fn new<P, S>(entries: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: Into<NormalizedPath>,
        S: Into<String>,
    {
        Self {
            identities: entries
                .into_iter()
                .map(|(path, identity)| (path.into(), identity.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn name(&self) -> &str {
        "static"
    }

    async fn identify(&self, folder: &Url) -> Result<Option<String>> {
        let Ok(path) = folder.to_file_path() else {
            return Ok(None);
        };
        Ok(self.identities.get(&NormalizedPath::new(path)).cloned())
    }
}
