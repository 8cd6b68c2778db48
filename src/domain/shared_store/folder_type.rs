//! Folder type module.
//!
//! This module contains the representation of the folder types a
//! shared store can expose.

use std::{fmt, str::FromStr};

use super::Error;

/// Represents the folder type of a shared store.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum FolderType {
    All,
    Inbox,
    Calendar,
    Contact,
    Note,
    Task,
}

impl FolderType {
    pub const VARIANTS: [FolderType; 6] = [
        Self::All,
        Self::Inbox,
        Self::Calendar,
        Self::Contact,
        Self::Note,
        Self::Task,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Inbox => "inbox",
            Self::Calendar => "calendar",
            Self::Contact => "contact",
            Self::Note => "note",
            Self::Task => "task",
        }
    }
}

impl FromStr for FolderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .into_iter()
            .find(|folder_type| folder_type.as_str() == s)
            .ok_or_else(|| Error::InvalidFolderType(s.to_owned()))
    }
}

impl fmt::Display for FolderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
