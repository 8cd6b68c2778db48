//! Settings module.
//!
//! This module contains the settings tree engine: dotted paths, the
//! tree itself, textual value coercion and persistence.

use std::{num::ParseIntError, result};
use thiserror::Error;

pub mod path;
pub use path::SettingsPath;

pub mod tree;
pub use tree::{deep_merge, SettingsTree, ROOT_KEY, ROOT_PATH};

pub mod value;
pub use value::{coerce, parse_int, parse_int_in_range, Assignment, ValueKind};

pub mod persistence;
pub use persistence::{to_sorted_pretty, LoadStatus};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse settings path {0:?}")]
    InvalidPath(String),
    #[error("cannot parse settings expression {0:?}: expected <path> = <value>")]
    ParseInjectExprError(String),
    #[error("cannot parse integer from {1:?}")]
    InvalidValue(#[source] ParseIntError, String),
    #[error("cannot use value {value}: expected a number between {min} and {max}")]
    OutOfRange { value: i64, min: i64, max: i64 },
    #[error("cannot use value {0:?}: expected one of {1}")]
    InvalidChoice(String, String),
    #[error("cannot serialize settings")]
    SerializeError(#[source] serde_json::Error),
}

pub type Result<T> = result::Result<T, Error>;
