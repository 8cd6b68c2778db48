//! Signature module.
//!
//! This module contains everything related to the HTML signatures
//! stored in the mail context.

use std::result;
use thiserror::Error;

pub mod file;
pub use file::SignatureFile;

pub mod signature;
pub use signature::{
    defaults, delete, export_all, get, set_default, upsert, Signature, SignatureEntry,
    SignatureExport, SIGNATURES_PATH,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse signature file name {0:?}: expected [<user>_]<name>_<id>.html")]
    ParseFileNameError(String),
    #[error("cannot find signature {0}")]
    FindSignatureError(String),
}

pub type Result<T> = result::Result<T, Error>;
