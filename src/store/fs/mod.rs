//! Filesystem store module.
//!
//! This module contains everything related to the directory-backed
//! store.

pub mod config;
pub use config::FsConfig;

pub mod store;
pub use store::{Error, FsStore, Result};
