//! Config module.
//!
//! This module contains everything related to the administrator's
//! configuration.

use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    result,
};
use thiserror::Error;

use crate::StoreConfig;

pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en_GB";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read config file {1}")]
    ReadConfigFileError(#[source] io::Error, PathBuf),
    #[error("cannot parse config file")]
    ParseConfigError(#[source] toml::de::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the administrator's configuration.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdminConfig {
    /// Represents the store holding the users documents.
    #[serde(default)]
    pub store: StoreConfig,
    /// Represents the directory backups are written to and read from.
    pub backup_dir: Option<PathBuf>,
    /// Represents the command file account secrets are piped through
    /// before being stored.
    pub encode_cmd: Option<String>,
    /// Represents the language used when the user directory does not
    /// define one.
    pub fallback_language: Option<String>,
}

impl AdminConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::ParseConfigError)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|err| Error::ReadConfigFileError(err, path.to_owned()))?;
        Self::from_toml_str(&content)
    }

    /// Gets the expanded backup directory path, the current directory
    /// by default. A path that cannot be expanded is used as is.
    pub fn backup_dir(&self) -> PathBuf {
        match self.backup_dir.as_ref() {
            Some(dir) => dir
                .to_str()
                .and_then(|dir| shellexpand::full(dir).ok())
                .map(|dir| PathBuf::from(dir.to_string()))
                .unwrap_or_else(|| dir.to_owned()),
            None => PathBuf::from("."),
        }
    }

    /// Gets the path of a backup file from its name.
    pub fn backup_file_path<S: AsRef<str>>(&self, file_name: S) -> PathBuf {
        self.backup_dir().join(file_name.as_ref())
    }

    pub fn fallback_language(&self) -> &str {
        self.fallback_language
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_LANGUAGE)
    }
}
