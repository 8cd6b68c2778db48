//! Store module.
//!
//! This module exposes the store trait, which can be used to plug the
//! settings engine into any mailbox storage (a mailbox property, a
//! file, a database row…).

use serde::Deserialize;
use std::{fmt, result};
use thiserror::Error;

use crate::{memory, Certificate, Certificates, MemoryStore, StoreConfig};

#[cfg(feature = "fs-store")]
use crate::{fs, FsStore};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build store with an empty config")]
    BuildStoreError,

    #[error(transparent)]
    MemoryStoreError(#[from] memory::Error),
    #[cfg(feature = "fs-store")]
    #[error(transparent)]
    FsStoreError(#[from] fs::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the JSON documents a mailbox holds.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// The webapp settings document.
    WebappSettings,
    /// The persistent settings document (categories).
    PersistentSettings,
    /// The recipients history used for autocompletion.
    RecipientHistory,
}

impl Property {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WebappSettings => "webapp-settings",
            Self::PersistentSettings => "persistent-settings",
            Self::RecipientHistory => "recipient-history",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents the directory information of a user.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserProfile {
    /// Represents the language of the user, like `nl_NL`.
    pub language: Option<String>,
    /// Represents the proxy addresses of the user. The primary one is
    /// prefixed by `SMTP:`, aliases by `smtp:`.
    #[serde(default)]
    pub addresses: Vec<String>,
}

pub trait Store {
    fn list_users(&self) -> Result<Vec<String>>;
    fn user_profile(&self, user: &str) -> Result<UserProfile>;

    fn read_property(&self, user: &str, property: Property) -> Result<Option<Vec<u8>>>;
    fn write_property(&self, user: &str, property: Property, data: &[u8]) -> Result<()>;
    fn delete_property(&self, user: &str, property: Property) -> Result<()>;

    fn list_certificates(&self, user: &str) -> Result<Certificates>;
    fn add_certificate(&self, user: &str, certificate: &Certificate) -> Result<()>;
    fn delete_certificate(&self, user: &str, id: &str) -> Result<()>;

    /// Builds the hexadecimal one-off entry id of an SMTP recipient.
    fn one_off_entry_id(&self, display_name: &str, smtp_address: &str) -> Result<String> {
        Ok(one_off_entry_id(display_name, smtp_address))
    }
}

const ONE_OFF_PROVIDER_UID: [u8; 16] = [
    0x81, 0x2b, 0x1f, 0xa4, 0xbe, 0xa3, 0x10, 0x19, 0x9d, 0x6e, 0x00, 0xdd, 0x01, 0x0f, 0x54, 0x02,
];
const ONE_OFF_UNICODE: u16 = 0x8000;
const ONE_OFF_NO_RICH_INFO: u16 = 0x0001;

/// Encodes the one-off entry id of an SMTP recipient, with unicode
/// strings and without rich info.
pub fn one_off_entry_id(display_name: &str, smtp_address: &str) -> String {
    let mut entry_id = vec![0u8; 4];
    entry_id.extend(ONE_OFF_PROVIDER_UID);
    entry_id.extend(0u16.to_le_bytes());
    entry_id.extend((ONE_OFF_UNICODE | ONE_OFF_NO_RICH_INFO).to_le_bytes());

    for field in [display_name, "SMTP", smtp_address] {
        for unit in field.encode_utf16().chain([0]) {
            entry_id.extend(unit.to_le_bytes());
        }
    }

    entry_id.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct StoreBuilder;

impl StoreBuilder {
    pub fn build(config: &StoreConfig) -> Result<Box<dyn Store>> {
        match config {
            StoreConfig::Memory => Ok(Box::new(MemoryStore::default())),
            #[cfg(feature = "fs-store")]
            StoreConfig::Fs(config) => Ok(Box::new(FsStore::new(config)?)),
            StoreConfig::None => Err(Error::BuildStoreError),
        }
    }
}
