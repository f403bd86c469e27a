//! Sync configuration loaded from `.workspace-state/config.toml`
//!
//! The file may also be JSON or YAML; the format follows the extension.
//! A missing file yields the defaults.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use state_fs::{ConfigStore, NormalizedPath};
use tracing::debug;

use crate::Result;
use crate::identity::{
    DEFAULT_TRANSLATION_DEPTH, FolderNameIdentity, IdentityProvider, StaticIdentity,
};

/// Directory holding configuration and default local data
pub const STATE_DIR: &str = ".workspace-state";

/// Configuration file name inside [`STATE_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

fn default_remote_dir() -> String {
    format!("{STATE_DIR}/remote")
}

fn default_state_file() -> String {
    format!("{STATE_DIR}/state.json")
}

fn default_translation_depth() -> usize {
    DEFAULT_TRANSLATION_DEPTH
}

/// How folder identities are computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    /// Last path segment of the folder
    #[default]
    FolderName,
    /// Explicit table in `[identity.folders]`
    Static,
}

/// `[identity]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub strategy: IdentityStrategy,

    /// Folder path to identity, used by the static strategy
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub folders: BTreeMap<String, String>,
}

/// Top-level sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory used as the remote store
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,

    /// Local workspace state file
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Identifier written into published data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,

    /// Nesting depth up to which stored values are rewritten
    #[serde(default = "default_translation_depth")]
    pub translation_depth: usize,

    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_dir: default_remote_dir(),
            state_file: default_state_file(),
            machine_id: None,
            translation_depth: default_translation_depth(),
            identity: IdentityConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Default configuration path under `root`.
    pub fn default_path(root: &NormalizedPath) -> NormalizedPath {
        root.join(STATE_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !path.exists() {
            debug!(%path, "No config file, using defaults");
            return Ok(Self::default());
        }
        Ok(ConfigStore::new().load(path)?)
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }

    /// Remote directory resolved against `base`.
    pub fn remote_dir(&self, base: &NormalizedPath) -> NormalizedPath {
        NormalizedPath::resolve(&self.remote_dir, base)
    }

    /// State file resolved against `base`.
    pub fn state_file(&self, base: &NormalizedPath) -> NormalizedPath {
        NormalizedPath::resolve(&self.state_file, base)
    }

    /// Assign a fresh machine id if none is set.
    ///
    /// Returns true when an id was generated and the config should be saved.
    pub fn ensure_machine_id(&mut self) -> bool {
        if self.machine_id.is_some() {
            return false;
        }
        self.machine_id = Some(uuid::Uuid::new_v4().to_string());
        true
    }

    /// Identity provider for the configured strategy. Relative folder
    /// paths in `[identity.folders]` are resolved against `base`.
    pub fn identity_provider(&self, base: &NormalizedPath) -> Arc<dyn IdentityProvider> {
        match self.identity.strategy {
            IdentityStrategy::FolderName => Arc::new(FolderNameIdentity),
            IdentityStrategy::Static => Arc::new(StaticIdentity::new(
                self.identity
                    .folders
                    .iter()
                    .map(|(path, identity)| (NormalizedPath::resolve(path, base), identity.clone())),
            )),
        }
    }
}
