//! Error types for state-core

use crate::document::SyncResource;

/// Result type for state-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in state-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A stored value in a remote document could not be parsed
    #[error("Failed to deserialize stored value for key '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote document itself could not be parsed
    #[error("Malformed remote {resource} document: {source}")]
    MalformedDocument {
        resource: SyncResource,
        #[source]
        source: serde_json::Error,
    },

    /// Operation is not available for this resource
    #[error("{operation} is not supported for {resource}")]
    Unsupported {
        resource: SyncResource,
        operation: String,
    },

    /// Remote data was written by a newer format version
    #[error("Remote {resource} data has version {found}, newer than supported version {supported}")]
    IncompatibleVersion {
        resource: SyncResource,
        found: u32,
        supported: u32,
    },

    /// A document without folders cannot be restored anywhere
    #[error("Refusing to publish {resource} without workspace folders")]
    NoFolders { resource: SyncResource },

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// A folder URI could not be parsed or built
    #[error("Invalid URI '{uri}': {message}")]
    InvalidUri { uri: String, message: String },

    /// No synchroniser is registered for the resource
    #[error("No synchroniser registered for {resource}")]
    UnknownResource { resource: SyncResource },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from state-fs
    #[error(transparent)]
    Fs(#[from] state_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn unsupported(resource: SyncResource, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            resource,
            operation: operation.into(),
        }
    }
}
