//! Signature file module.
//!
//! This module parses the names of signature backup files.

use std::path::Path;

use super::{Error, Result};

/// Represents the signature name and id encoded in a backup file
/// name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignatureFile {
    pub name: String,
    pub id: String,
}

impl SignatureFile {
    /// Parses file names shaped like `<user>_<name>_<id>.html` or
    /// `<name>_<id>.html`. Dashes of the name are turned back into
    /// spaces.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::ParseFileNameError(path.to_string_lossy().to_string()))?;
        let parts: Vec<&str> = file_name.split('_').collect();

        let (name, id) = match parts.as_slice() {
            [name, id] | [_, name, id] => (name, id),
            _ => return Err(Error::ParseFileNameError(file_name.to_owned())),
        };
        let id = id.split('.').next().unwrap_or_default();

        if name.is_empty() || id.is_empty() {
            return Err(Error::ParseFileNameError(file_name.to_owned()));
        }

        Ok(Self {
            name: name.replace('-', " "),
            id: id.to_owned(),
        })
    }

    /// Gets the signature name of a file added without explicit id:
    /// the file name without its extensions.
    pub fn plain_name<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.split('.').next())
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| Error::ParseFileNameError(path.to_string_lossy().to_string()))
    }
}
