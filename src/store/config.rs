//! Store config module.
//!
//! This module contains the representation of the store
//! configuration.

use serde::Deserialize;

#[cfg(feature = "fs-store")]
use crate::FsConfig;

/// Represents the store configuration.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StoreConfig {
    None,
    /// Keeps everything in memory, mostly for testing purpose.
    Memory,
    /// Stores users documents in a directory tree.
    #[cfg(feature = "fs-store")]
    Fs(FsConfig),
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::None
    }
}
