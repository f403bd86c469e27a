use std::path::PathBuf;

use colored::Colorize;
use state_core::{CancellationToken, SyncEngine};

use super::{Session, finish};
use crate::error::Result;

/// Run the pull command
///
/// Workspaces whose folders do not match the published ones are left
/// untouched; that is reported but is not an error.
pub async fn run_pull(session: Session, folders: &[PathBuf]) -> Result<()> {
    println!("{} Restoring workspace state...", "=>".blue().bold());

    let ctx = session.context(folders)?;
    let report = SyncEngine::for_context(ctx)
        .pull(&CancellationToken::new())
        .await;

    finish(report, "Pull")
}
