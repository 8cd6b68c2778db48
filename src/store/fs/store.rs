//! Filesystem store module.
//!
//! This module contains the definition of the filesystem store and
//! its trait implementation. The layout of the root directory is:
//!
//! ```text
//! <root>/<user>/profile.toml
//! <root>/<user>/<property>.json
//! <root>/<user>/certificates/<id>.toml
//! <root>/<user>/certificates/<id>.bin
//! ```

use log::{debug, trace};
use std::{
    fs, io,
    path::{Path, PathBuf},
    result,
};
use thiserror::Error;

use crate::{store, Certificate, Certificates, FsConfig, Property, Store, UserProfile};

const PROFILE_FILE: &str = "profile.toml";
const CERTIFICATES_DIR: &str = "certificates";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find store root directory {0}")]
    FindRootDirError(PathBuf),
    #[error("cannot read directory {1}")]
    ReadDirError(#[source] io::Error, PathBuf),
    #[error("cannot create directory {1}")]
    CreateDirError(#[source] io::Error, PathBuf),
    #[error("cannot find user {0}")]
    FindUserError(String),
    #[error("cannot use {0:?} as a file name")]
    InvalidNameError(String),
    #[error("cannot read file {1}")]
    ReadFileError(#[source] io::Error, PathBuf),
    #[error("cannot write file {1}")]
    WriteFileError(#[source] io::Error, PathBuf),
    #[error("cannot delete file {1}")]
    DeleteFileError(#[source] io::Error, PathBuf),
    #[error("cannot parse user profile {1}")]
    ParseProfileError(#[source] toml::de::Error, PathBuf),
    #[error("cannot parse certificate {1}")]
    ParseCertificateError(#[source] toml::de::Error, PathBuf),
    #[error("cannot serialize certificate {1}")]
    SerializeCertificateError(#[source] toml::ser::Error, String),
    #[error("cannot find certificate {1} of user {0}")]
    FindCertificateError(String, String),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the filesystem store.
#[derive(Debug, Clone)]
pub struct FsStore {
    root_dir: PathBuf,
}

impl FsStore {
    pub fn new(config: &FsConfig) -> Result<Self> {
        let root_dir = shellexpand::full(&config.root_dir.to_string_lossy())
            .map(|dir| PathBuf::from(dir.to_string()))
            .unwrap_or_else(|_| config.root_dir.to_owned());

        if !root_dir.is_dir() {
            return Err(Error::FindRootDirError(root_dir));
        }

        Ok(Self { root_dir })
    }

    /// Creates the directory of a new user and writes its profile,
    /// if given.
    pub fn create_user(&self, user: &str, profile: Option<&str>) -> Result<PathBuf> {
        let dir = self.root_dir.join(validate_name(user)?);
        fs::create_dir_all(&dir).map_err(|err| Error::CreateDirError(err, dir.to_owned()))?;

        if let Some(profile) = profile {
            let path = dir.join(PROFILE_FILE);
            fs::write(&path, profile).map_err(|err| Error::WriteFileError(err, path))?;
        }

        Ok(dir)
    }

    fn user_dir(&self, user: &str) -> Result<PathBuf> {
        let dir = self.root_dir.join(validate_name(user)?);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(Error::FindUserError(user.to_owned()))
        }
    }

    fn property_path(&self, user: &str, property: Property) -> Result<PathBuf> {
        Ok(self.user_dir(user)?.join(format!("{}.json", property.name())))
    }

    fn certificates_dir(&self, user: &str) -> Result<PathBuf> {
        Ok(self.user_dir(user)?.join(CERTIFICATES_DIR))
    }
}

impl Store for FsStore {
    fn list_users(&self) -> store::Result<Vec<String>> {
        let entries = fs::read_dir(&self.root_dir)
            .map_err(|err| Error::ReadDirError(err, self.root_dir.to_owned()))?;

        let mut users = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| Error::ReadDirError(err, self.root_dir.to_owned()))?;
            if entry.path().is_dir() {
                users.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        users.sort();

        trace!("users: {:?}", users);
        Ok(users)
    }

    fn user_profile(&self, user: &str) -> store::Result<UserProfile> {
        let path = self.user_dir(user)?.join(PROFILE_FILE);
        let profile = match read_optional(&path)? {
            Some(data) => toml::from_slice(&data)
                .map_err(|err| Error::ParseProfileError(err, path.to_owned()))?,
            None => UserProfile::default(),
        };
        Ok(profile)
    }

    fn read_property(&self, user: &str, property: Property) -> store::Result<Option<Vec<u8>>> {
        let path = self.property_path(user, property)?;
        debug!("reading {} of {} from {:?}", property, user, path);
        Ok(read_optional(&path)?)
    }

    fn write_property(&self, user: &str, property: Property, data: &[u8]) -> store::Result<()> {
        let path = self.property_path(user, property)?;
        debug!("writing {} of {} to {:?}", property, user, path);
        Ok(write_atomically(&path, data)?)
    }

    fn delete_property(&self, user: &str, property: Property) -> store::Result<()> {
        let path = self.property_path(user, property)?;
        Ok(delete_optional(&path)?)
    }

    fn list_certificates(&self, user: &str) -> store::Result<Certificates> {
        let dir = self.certificates_dir(user)?;
        let mut certificates = Certificates::default();

        if !dir.is_dir() {
            return Ok(certificates);
        }

        let entries = fs::read_dir(&dir).map_err(|err| Error::ReadDirError(err, dir.to_owned()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| Error::ReadDirError(err, dir.to_owned()))?
                .path();
            if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let data = fs::read(&path).map_err(|err| Error::ReadFileError(err, path.to_owned()))?;
            let mut certificate: Certificate = toml::from_slice(&data)
                .map_err(|err| Error::ParseCertificateError(err, path.to_owned()))?;
            let body_path = path.with_extension("bin");
            certificate.body = fs::read(&body_path)
                .map_err(|err| Error::ReadFileError(err, body_path.to_owned()))?;
            certificates.push(certificate);
        }

        Ok(certificates)
    }

    fn add_certificate(&self, user: &str, certificate: &Certificate) -> store::Result<()> {
        let dir = self.certificates_dir(user)?;
        fs::create_dir_all(&dir).map_err(|err| Error::CreateDirError(err, dir.to_owned()))?;

        let name = validate_name(&certificate.id)?;
        let meta = toml::to_vec(certificate)
            .map_err(|err| Error::SerializeCertificateError(err, certificate.id.to_owned()))?;
        write_atomically(&dir.join(format!("{}.bin", name)), &certificate.body)?;
        write_atomically(&dir.join(format!("{}.toml", name)), &meta)?;

        Ok(())
    }

    fn delete_certificate(&self, user: &str, id: &str) -> store::Result<()> {
        let dir = self.certificates_dir(user)?;
        let name = validate_name(id)?;
        let meta_path = dir.join(format!("{}.toml", name));

        if !meta_path.is_file() {
            return Err(Error::FindCertificateError(user.to_owned(), id.to_owned()).into());
        }

        delete_optional(&meta_path)?;
        delete_optional(&dir.join(format!("{}.bin", name)))?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(|c| c == '/' || c == '\\' || c == '\0');

    if invalid {
        Err(Error::InvalidNameError(name.to_owned()))
    } else {
        Ok(name)
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::ReadFileError(err, path.to_owned())),
    }
}

fn delete_optional(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::DeleteFileError(err, path.to_owned())),
    }
}

/// Writes the whole file next to its destination then renames it, so
/// that readers never see a partial document.
fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    fs::write(&tmp_path, data).map_err(|err| Error::WriteFileError(err, tmp_path.to_owned()))?;
    fs::rename(&tmp_path, path).map_err(|err| Error::WriteFileError(err, path.to_owned()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_file_names() {
        assert!(validate_name("alice").is_ok());
        assert!(validate_name("alice@example.org").is_ok());
        assert!(matches!(validate_name(""), Err(Error::InvalidNameError(_))));
        assert!(matches!(validate_name(".."), Err(Error::InvalidNameError(_))));
        assert!(matches!(validate_name("a/b"), Err(Error::InvalidNameError(_))));
    }

    #[test]
    fn missing_root_dir() {
        let config = FsConfig {
            root_dir: PathBuf::from("/this/directory/does/not/exist"),
        };
        assert!(matches!(
            FsStore::new(&config),
            Err(Error::FindRootDirError(_))
        ));
    }
}
