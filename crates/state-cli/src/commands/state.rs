//! Direct access to the local workspace state store

use colored::Colorize;
use serde_json::Value;
use state_core::{StateStore, StorageScope, StorageTarget};

use super::Session;
use crate::error::{CliError, Result};

/// Run the set command
pub async fn run_set(session: &Session, key: &str, value: &str) -> Result<()> {
    let value: Value = serde_json::from_str(value)
        .map_err(|e| CliError::user(format!("Value for '{}' is not valid JSON: {}", key, e)))?;

    session
        .state_store()
        .store(key, &value, StorageScope::Workspace, StorageTarget::User)
        .await?;

    println!("{} Stored {}", "OK".green().bold(), key.cyan());
    Ok(())
}

/// Run the get command
pub async fn run_get(session: &Session, key: &str) -> Result<()> {
    match session
        .state_store()
        .get(key, StorageScope::Workspace)
        .await?
    {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(CliError::user(format!("No value stored for '{}'", key))),
    }
}
