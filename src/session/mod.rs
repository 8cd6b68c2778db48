//! Session module.
//!
//! This module contains the session, the explicit handle through
//! which every command reads and writes the documents of the users.

use std::{io, path::PathBuf, result};
use thiserror::Error;

use crate::{files, recipients, sendas, settings, shared_store, signature, store};

mod session;
pub use session::{Session, UserSelection};

mod backup;
mod commands;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read backup file {1}")]
    ReadBackupFileError(#[source] io::Error, PathBuf),
    #[error("cannot write backup file {1}")]
    WriteBackupFileError(#[source] io::Error, PathBuf),
    #[error("cannot parse backup file {1}")]
    ParseBackupFileError(#[source] serde_json::Error, PathBuf),
    #[error("cannot restore settings from {0}: missing settings root")]
    InvalidSettingsBackupError(PathBuf),
    #[error("cannot write webapp settings of {0}: missing settings root")]
    MissingSettingsRootError(String),

    #[error(transparent)]
    StoreError(#[from] store::Error),
    #[error(transparent)]
    SettingsError(#[from] settings::Error),
    #[error(transparent)]
    SignatureError(#[from] signature::Error),
    #[error(transparent)]
    SendAsError(#[from] sendas::Error),
    #[error(transparent)]
    SharedStoreError(#[from] shared_store::Error),
    #[error(transparent)]
    FilesError(#[from] files::Error),
    #[error(transparent)]
    RecipientsError(#[from] recipients::Error),
}

pub type Result<T> = result::Result<T, Error>;
