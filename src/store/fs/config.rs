use serde::Deserialize;
use std::path::PathBuf;

/// Represents the filesystem store config.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FsConfig {
    /// Represents the directory holding one subdirectory per user.
    pub root_dir: PathBuf,
}
