//! File account module.
//!
//! This module contains everything related to the accounts of the
//! files plugin (FTP, WebDAV, ownCloud and SMB shares).

use std::{result, string};
use thiserror::Error;

use crate::process;

pub mod backend;
pub use backend::FileBackend;

pub mod account;
pub use account::{add, list, remove, FileAccount, FileAccountEntry, ACCOUNTS_PATH};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot use unknown files backend {0:?}: expected one of ftp, webdav, owncloud, smb")]
    UnknownBackend(String),
    #[error("cannot encode value of backend option {1}")]
    EncodeValueError(#[source] process::Error, String),
    #[error("cannot parse encoded value of backend option {1}")]
    ParseEncodedValueError(#[source] string::FromUtf8Error, String),
    #[error("cannot parse file accounts")]
    ParseAccountsError(#[source] serde_json::Error),
}

pub type Result<T> = result::Result<T, Error>;
