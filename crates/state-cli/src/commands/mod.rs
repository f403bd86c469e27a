//! Command implementations for the wstate CLI

mod pull;
mod push;
mod show;
mod state;

pub use pull::run_pull;
pub use push::run_push;
pub use show::run_show;
pub use state::{run_get, run_set};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use state_core::{
    DirectoryRemoteStore, FileStateStore, SyncConfig, SyncContext, SyncReport,
    WorkspaceIdentityResolver,
};
use state_fs::NormalizedPath;
use tracing::debug;

use crate::error::{CliError, Result};

/// Configuration and stores for one CLI invocation.
#[derive(Debug)]
pub struct Session {
    /// Directory relative paths are resolved against
    pub base: NormalizedPath,
    pub config_path: NormalizedPath,
    pub config: SyncConfig,
}

impl Session {
    /// Load configuration from `config`, or the default location under `cwd`.
    pub fn load(cwd: &Path, config: Option<&Path>) -> Result<Self> {
        let base = NormalizedPath::new(cwd);
        let config_path = match config {
            Some(path) => NormalizedPath::resolve(path, cwd),
            None => SyncConfig::default_path(&base),
        };
        let config = SyncConfig::load(&config_path)?;
        debug!(config = %config_path, "Loaded configuration");

        Ok(Self {
            base,
            config_path,
            config,
        })
    }

    pub fn state_store(&self) -> Arc<FileStateStore> {
        Arc::new(FileStateStore::new(self.config.state_file(&self.base)))
    }

    pub fn remote_store(&self) -> Arc<DirectoryRemoteStore> {
        Arc::new(DirectoryRemoteStore::new(self.config.remote_dir(&self.base)))
    }

    /// Build the sync context for a workspace made of `folders`.
    pub fn context(&self, folders: &[PathBuf]) -> Result<SyncContext> {
        let mut paths = Vec::with_capacity(folders.len());
        for folder in folders {
            let path = NormalizedPath::resolve(folder, &self.base);
            if !path.exists() {
                return Err(CliError::user(format!("Folder not found: {}", path)));
            }
            paths.push(path);
        }

        let resolver =
            WorkspaceIdentityResolver::from_paths(&paths, self.config.identity_provider(&self.base))?
                .with_translation_depth(self.config.translation_depth);

        let ctx = SyncContext::new(self.state_store(), self.remote_store(), Arc::new(resolver));
        Ok(match &self.config.machine_id {
            Some(machine_id) => ctx.with_machine_id(machine_id.clone()),
            None => ctx,
        })
    }

    /// Give this machine an id on first use and persist it.
    pub fn ensure_machine_id(&mut self) -> Result<()> {
        if self.config.ensure_machine_id() {
            self.config.save(&self.config_path)?;
            debug!(config = %self.config_path, "Generated machine id");
        }
        Ok(())
    }
}

/// Print report lines and turn a failed report into an error.
fn finish(report: SyncReport, operation: &str) -> Result<()> {
    for action in &report.actions {
        println!("   {} {}", "+".green(), action);
    }
    for error in &report.errors {
        println!("   {} {}", "!".red(), error);
    }

    if report.success {
        println!("{} {} complete.", "OK".green().bold(), operation);
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} finished with {} error(s)",
            operation,
            report.errors.len()
        )))
    }
}
