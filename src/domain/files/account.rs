//! File account module.
//!
//! This module contains the editor of the accounts of the files
//! plugin, stored in a map keyed by a freshly generated UUID.

use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::{process, SettingsPath, SettingsTree};

use super::{Error, FileBackend, Result};

pub const ACCOUNTS_PATH: &str = "settings.zarafa.v1.plugins.files.accounts";

const STATUS_OK: &str = "ok";
const STATUS_DESCRIPTION_OK: &str = "Account is ready to use.";

/// Backend options that are flags rather than secrets, hence never
/// encoded.
const PLAIN_OPTIONS: [&str; 3] = ["server_ssl", "server_pasv", "use_zarafa_credentials"];

/// Represents a file account to add.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAccount {
    pub name: String,
    pub backend: FileBackend,
    pub backend_config: Map<String, Value>,
}

impl FileAccount {
    pub fn new<N: ToString>(name: N, backend: FileBackend) -> Self {
        Self {
            name: name.to_string(),
            backend,
            backend_config: Map::default(),
        }
    }

    pub fn option<K: ToString, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.backend_config.insert(key.to_string(), value.into());
        self
    }

    /// Pipes every text option of the backend configuration through
    /// the given shell command and replaces it with the trimmed
    /// output. Flag options are left as they are.
    pub fn encode(&mut self, encode_cmd: &str) -> Result<()> {
        for (key, value) in self.backend_config.iter_mut() {
            if PLAIN_OPTIONS.contains(&key.as_str()) {
                continue;
            }

            if let Value::String(text) = value {
                debug!("encoding backend option {}", key);
                let output = process::run(encode_cmd, text.as_bytes())
                    .map_err(|err| Error::EncodeValueError(err, key.to_owned()))?;
                let output = String::from_utf8(output)
                    .map_err(|err| Error::ParseEncodedValueError(err, key.to_owned()))?;
                *text = output.trim().to_owned();
            }
        }

        Ok(())
    }
}

/// Represents a file account read from the tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileAccountEntry {
    pub id: String,
    pub name: String,
    pub backend: String,
    pub status: String,
    pub status_description: String,
    pub cannot_change: bool,
    pub backend_config: Map<String, Value>,
    pub backend_features: Map<String, Value>,
}

fn accounts_path() -> SettingsPath {
    SettingsPath::from_static(ACCOUNTS_PATH)
}

/// Lists the file accounts of the tree. Entries without an `id`
/// field get the key they are stored under.
pub fn list(tree: &SettingsTree) -> Result<Vec<FileAccountEntry>> {
    let accounts = match tree.get_map(&accounts_path()) {
        Some(accounts) => accounts,
        None => return Ok(Vec::new()),
    };

    accounts
        .iter()
        .map(|(id, account)| {
            let mut entry: FileAccountEntry =
                serde_json::from_value(account.clone()).map_err(Error::ParseAccountsError)?;
            if entry.id.is_empty() {
                entry.id = id.clone();
            }
            Ok(entry)
        })
        .collect()
}

/// Adds a file account under a newly generated id and returns it.
/// Existing accounts are kept.
pub fn add(tree: &mut SettingsTree, account: &FileAccount) -> Uuid {
    let accounts = tree.map_mut(&accounts_path());

    let mut id = Uuid::new_v4();
    while accounts.contains_key(&id.to_string()) {
        id = Uuid::new_v4();
    }

    info!("adding {} account {} as {}", account.backend, account.name, id);
    accounts.insert(
        id.to_string(),
        json!({
            "id": id.to_string(),
            "status": STATUS_OK,
            "status_description": STATUS_DESCRIPTION_OK,
            "backend_config": account.backend_config,
            "cannot_change": false,
            "name": account.name,
            "backend": account.backend.as_str(),
            "backend_features": account.backend.features_map(),
        }),
    );

    id
}

/// Removes the file account matching the given id. Returns false
/// when there is no such account.
pub fn remove(tree: &mut SettingsTree, id: &str) -> bool {
    let removed = tree.delete(&accounts_path().join(id)).is_some();
    if removed {
        info!("removing file account {}", id);
    }
    removed
}
