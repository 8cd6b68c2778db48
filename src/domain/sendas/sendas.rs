//! Send-as module.
//!
//! This module contains the editor of the sent-from addresses list
//! of the mail context. Entries are identified by their `rowid`, not
//! by their position in the list.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{SettingsPath, SettingsTree};

use super::{Error, Result};

pub const SENDAS_PATH: &str = "settings.zarafa.v1.contexts.mail.sendas";

const SMTP_ADDRESS_TYPE: &str = "SMTP";
const MAIL_USER_DISPLAY_TYPE: i64 = 6;
const MAIL_USER_OBJECT_TYPE: i64 = 6;

/// Represents a sent-from address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendAs {
    pub address_type: String,
    pub display_name: String,
    pub display_type: i64,
    pub display_type_ex: i64,
    pub email_address: String,
    pub entryid: String,
    pub forward_mail: bool,
    pub new_mail: bool,
    pub object_type: i64,
    pub recipient_type: i64,
    pub reply_mail: bool,
    pub rowid: i64,
    pub search_key: String,
    pub smtp_address: String,
    /// Keeps the fields this editor does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SendAs {
    /// Builds a new SMTP entry, not default for any kind of message.
    /// The row id is assigned when the entry is added.
    pub fn new<N, A, E>(display_name: N, smtp_address: A, entryid: E) -> Self
    where
        N: ToString,
        A: ToString,
        E: ToString,
    {
        Self {
            address_type: SMTP_ADDRESS_TYPE.into(),
            display_name: display_name.to_string(),
            display_type: MAIL_USER_DISPLAY_TYPE,
            entryid: entryid.to_string(),
            object_type: MAIL_USER_OBJECT_TYPE,
            smtp_address: smtp_address.to_string(),
            ..Self::default()
        }
    }

    pub fn forward_mail(mut self, default: bool) -> Self {
        self.forward_mail = default;
        self
    }

    pub fn new_mail(mut self, default: bool) -> Self {
        self.new_mail = default;
        self
    }

    pub fn reply_mail(mut self, default: bool) -> Self {
        self.reply_mail = default;
        self
    }
}

/// Represents the changes to apply to an existing entry. Fields left
/// to `None` are kept as they are.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SendAsChanges {
    pub display_name: Option<String>,
    pub smtp_address: Option<String>,
    pub forward_mail: Option<bool>,
    pub new_mail: Option<bool>,
    pub reply_mail: Option<bool>,
}

fn sendas_path() -> SettingsPath {
    SettingsPath::from_static(SENDAS_PATH)
}

/// Lists the sent-from addresses of the tree.
pub fn list(tree: &SettingsTree) -> Result<Vec<SendAs>> {
    match tree.get(&sendas_path()) {
        Some(list) => serde_json::from_value(list.clone()).map_err(Error::ParseSendAsError),
        None => Ok(Vec::new()),
    }
}

fn save(tree: &mut SettingsTree, list: &[SendAs]) -> Result<()> {
    let list = serde_json::to_value(list).map_err(Error::SerializeSendAsError)?;
    tree.set(&sendas_path(), list);
    Ok(())
}

/// Computes the row id of the next entry: one more than the highest
/// existing row id, or 0 for an empty list.
pub fn next_rowid(list: &[SendAs]) -> Result<i64> {
    match list.iter().map(|sendas| sendas.rowid).max() {
        Some(rowid) => rowid.checked_add(1).ok_or(Error::RowIdOverflowError),
        None => Ok(0),
    }
}

/// Appends an entry and returns its newly assigned row id.
pub fn add(tree: &mut SettingsTree, mut sendas: SendAs) -> Result<i64> {
    if sendas.display_name.trim().is_empty() {
        return Err(Error::MissingFieldError("display name"));
    }
    if sendas.smtp_address.trim().is_empty() {
        return Err(Error::MissingFieldError("email address"));
    }

    let mut list = list(tree)?;
    sendas.rowid = next_rowid(&list)?;
    info!("creating sendas line {} for {}", sendas.rowid, sendas.smtp_address);

    let rowid = sendas.rowid;
    list.push(sendas);
    save(tree, &list)?;
    Ok(rowid)
}

/// Extracts the alias addresses out of the proxy addresses of a
/// user: the ones prefixed by a lowercase `smtp:`. The primary
/// address (uppercase `SMTP:`) and other address types are skipped.
pub fn secondary_addresses<S: AsRef<str>>(proxy_addresses: &[S]) -> Vec<String> {
    proxy_addresses
        .iter()
        .filter_map(|address| address.as_ref().strip_prefix("smtp:"))
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Appends one entry per `(address, entryid)` alias, with
/// consecutive row ids. Alias entries are never default.
pub fn add_from_aliases<I>(tree: &mut SettingsTree, aliases: I) -> Result<Vec<i64>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut list = list(tree)?;
    let mut rowids = Vec::new();

    for (address, entryid) in aliases {
        let rowid = next_rowid(&list)?;
        debug!("adding alias {} to sendas list as row {}", address, rowid);
        let mut sendas = SendAs::new(&address, &address, entryid);
        sendas.rowid = rowid;
        list.push(sendas);
        rowids.push(rowid);
    }

    save(tree, &list)?;
    Ok(rowids)
}

/// Applies the given changes to the entry matching the row id.
/// Returns whether anything actually changed, in which case the list
/// is written back once.
pub fn update(tree: &mut SettingsTree, rowid: i64, changes: &SendAsChanges) -> Result<bool> {
    let mut list = list(tree)?;
    let sendas = list
        .iter_mut()
        .find(|sendas| sendas.rowid == rowid)
        .ok_or(Error::FindSendAsError(rowid))?;

    let mut changed = false;
    if let Some(name) = &changes.display_name {
        changed |= replace(&mut sendas.display_name, name.clone());
    }
    if let Some(address) = &changes.smtp_address {
        changed |= replace(&mut sendas.smtp_address, address.clone());
    }
    if let Some(default) = changes.forward_mail {
        changed |= replace(&mut sendas.forward_mail, default);
    }
    if let Some(default) = changes.new_mail {
        changed |= replace(&mut sendas.new_mail, default);
    }
    if let Some(default) = changes.reply_mail {
        changed |= replace(&mut sendas.reply_mail, default);
    }

    if changed {
        info!("writing new sendas settings for row {}", rowid);
        save(tree, &list)?;
    }

    Ok(changed)
}

fn replace<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        false
    } else {
        *field = value;
        true
    }
}

/// Removes the first entry matching the row id and returns it. Does
/// nothing when no entry matches.
pub fn delete(tree: &mut SettingsTree, rowid: i64) -> Result<Option<SendAs>> {
    let mut list = list(tree)?;

    match list.iter().position(|sendas| sendas.rowid == rowid) {
        Some(pos) => {
            info!("removing sendas row {}", rowid);
            let sendas = list.remove(pos);
            save(tree, &list)?;
            Ok(Some(sendas))
        }
        None => Ok(None),
    }
}
