//! Send-as module.
//!
//! This module contains everything related to the sent-from
//! addresses (send-as identities) of a user.

use std::result;
use thiserror::Error;

pub mod sendas;
pub use sendas::{
    add, add_from_aliases, delete, list, next_rowid, secondary_addresses, update, SendAs,
    SendAsChanges, SENDAS_PATH,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse sendas list")]
    ParseSendAsError(#[source] serde_json::Error),
    #[error("cannot serialize sendas list")]
    SerializeSendAsError(#[source] serde_json::Error),
    #[error("cannot find sendas row {0}")]
    FindSendAsError(i64),
    #[error("cannot add sendas address: {0} is missing")]
    MissingFieldError(&'static str),
    #[error("cannot allocate sendas row id: highest row id reached")]
    RowIdOverflowError,
}

pub type Result<T> = result::Result<T, Error>;
