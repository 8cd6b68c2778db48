//! Shared store module.
//!
//! This module contains everything related to the folders of other
//! users shown in the hierarchy of a user.

use std::result;
use thiserror::Error;

pub mod folder_type;
pub use folder_type::FolderType;

pub mod shared_store;
pub use shared_store::{add, list, remove, SharedStore, SHARED_STORES_PATH};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot use unknown folder type {0:?}: expected one of all, inbox, calendar, contact, note, task")]
    InvalidFolderType(String),
}

pub type Result<T> = result::Result<T, Error>;
