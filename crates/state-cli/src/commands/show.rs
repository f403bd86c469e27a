//! Show command: inspect the published workspace state

use colored::Colorize;
use state_core::{RemoteStore, SyncResource, WorkspaceStateDocument};

use super::Session;
use crate::error::Result;

/// Run the show command
pub async fn run_show(session: &Session, json: bool) -> Result<()> {
    let remote = session.remote_store();
    let resource = SyncResource::WorkspaceState;

    let Some(slot) = remote.read(resource).await? else {
        println!("No workspace state published yet.");
        return Ok(());
    };
    let Some(data) = slot.sync_data.as_ref() else {
        println!("No workspace state published yet.");
        return Ok(());
    };
    let Some(document) = WorkspaceStateDocument::from_optional_content(&data.content)? else {
        println!("No workspace state published yet.");
        return Ok(());
    };

    if json {
        let pretty = serde_json::to_string_pretty(&document).map_err(state_core::Error::from)?;
        println!("{}", pretty);
        return Ok(());
    }

    println!("{} {}", resource.to_string().bold(), slot.ref_.dimmed());
    println!("   Version: {}", data.version);
    println!(
        "   Machine: {}",
        data.machine_id.as_deref().unwrap_or("unknown")
    );
    if let Some(updated) = remote.last_updated(resource)? {
        println!("   Updated: {}", updated.to_rfc3339());
    }

    println!();
    println!("Folders:");
    for folder in &document.folders {
        println!(
            "   {} {} {}",
            "-".cyan(),
            folder.workspace_folder_identity,
            folder.resource_uri.dimmed()
        );
    }

    println!();
    println!("Keys ({}):", document.storage.len());
    for key in document.storage.keys() {
        println!("   {} {}", "-".cyan(), key);
    }

    Ok(())
}
