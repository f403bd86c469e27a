//! Filesystem layer for workspace state sync
//!
//! Provides normalized path handling (including segment-aware prefix
//! rebasing used by URI translation), atomic file I/O and format-agnostic
//! configuration loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
