use std::path::PathBuf;

use colored::Colorize;
use state_core::{CancellationToken, SyncEngine};

use super::{Session, finish};
use crate::error::Result;

/// Run the push command
pub async fn run_push(mut session: Session, folders: &[PathBuf]) -> Result<()> {
    println!("{} Publishing workspace state...", "=>".blue().bold());

    session.ensure_machine_id()?;
    let ctx = session.context(folders)?;
    let report = SyncEngine::for_context(ctx)
        .push(&CancellationToken::new())
        .await;

    finish(report, "Push")
}
