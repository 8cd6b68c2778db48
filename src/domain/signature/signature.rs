//! Signature module.
//!
//! This module contains the signature editor, working on the
//! signatures collection of the mail context:
//!
//! ```json
//! "signatures": {
//!   "all": {"<id>": {"name": "…", "content": "<p>…</p>", "isHTML": true}},
//!   "new_message": "<id>",
//!   "replyforward_message": "<id>"
//! }
//! ```

use chrono::Utc;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{SettingsPath, SettingsTree};

use super::{Error, Result};

pub const SIGNATURES_PATH: &str = "settings.zarafa.v1.contexts.mail.signatures";

const NEW_MESSAGE: &str = "new_message";
const REPLY_FORWARD_MESSAGE: &str = "replyforward_message";

/// Represents an HTML signature.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl Signature {
    pub fn new<N: ToString, C: ToString>(name: N, content: C) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    fn to_value(&self) -> Value {
        json!({"name": self.name, "content": self.content, "isHTML": true})
    }
}

/// Represents a signature read from the tree.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignatureEntry<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub content: &'a str,
}

impl SignatureEntry<'_> {
    /// Builds the backup file name of the signature:
    /// `<user>_<name>_<id>.html`. Spaces and path separators of the
    /// name are replaced by dashes.
    ///
    /// A user or signature name containing `_` gives a file name that
    /// [`SignatureFile::parse`](super::SignatureFile::parse) rejects,
    /// so such a backup cannot be restored with replace.
    pub fn file_name(&self, user: &str) -> String {
        let name = self.name.replace(|c| c == ' ' || c == '/' || c == '\\', "-");
        format!("{}_{}_{}.html", user, name, self.id)
    }
}

/// Represents a read-only view over the signatures of a tree.
///
/// Every call to [`SignatureExport::iter`] starts over from the first
/// signature.
#[derive(Debug, Clone)]
pub struct SignatureExport<'a> {
    all: Option<&'a Map<String, Value>>,
}

impl<'a> SignatureExport<'a> {
    pub fn iter(&self) -> impl Iterator<Item = SignatureEntry<'a>> + 'a {
        self.all
            .into_iter()
            .flat_map(|all| all.iter())
            .filter_map(|(id, signature)| {
                let signature = signature.as_object()?;
                Some(SignatureEntry {
                    id,
                    name: signature.get("name").and_then(Value::as_str).unwrap_or_default(),
                    content: signature
                        .get("content")
                        .and_then(Value::as_str)
                        .unwrap_or_default(),
                })
            })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

fn signatures_path() -> SettingsPath {
    SettingsPath::from_static(SIGNATURES_PATH)
}

/// Lists the signatures of the tree.
pub fn export_all(tree: &SettingsTree) -> SignatureExport<'_> {
    SignatureExport {
        all: tree.get_map(&signatures_path().join("all")),
    }
}

/// Gets the signature matching the given id.
pub fn get(tree: &SettingsTree, id: &str) -> Option<Signature> {
    let signature = tree.get(&signatures_path().join("all").join(id))?;
    serde_json::from_value(signature.clone()).ok()
}

/// Gets the ids of the default signatures for new messages and for
/// replies/forwards.
pub fn defaults(tree: &SettingsTree) -> (Option<String>, Option<String>) {
    let path = signatures_path();
    (
        tree.get(&path.join(NEW_MESSAGE)).and_then(id_from_value),
        tree.get(&path.join(REPLY_FORWARD_MESSAGE))
            .and_then(id_from_value),
    )
}

/// Inserts or replaces a signature and returns its id.
///
/// When no id is given, a new one is allocated from the current Unix
/// timestamp, bumped until it does not match any existing signature.
/// When `set_as_default` is true, the signature becomes the default
/// one for both new messages and replies/forwards.
pub fn upsert(
    tree: &mut SettingsTree,
    id: Option<&str>,
    signature: &Signature,
    set_as_default: bool,
) -> String {
    let path = signatures_path();
    let all = tree.map_mut(&path.join("all"));

    let id = match id {
        Some(id) => {
            info!("replacing signature {} with {}", id, signature.name);
            id.to_owned()
        }
        None => {
            let id = generate_id(all, Utc::now().timestamp());
            info!("adding signature {} with {}", id, signature.name);
            id
        }
    };

    all.insert(id.clone(), signature.to_value());

    if set_as_default {
        info!("changing default signature to {}", id);
        tree.set(&path.join(NEW_MESSAGE), id.clone());
        tree.set(&path.join(REPLY_FORWARD_MESSAGE), id.clone());
    }

    id
}

/// Makes an existing signature the default one for both new
/// messages and replies/forwards.
pub fn set_default(tree: &mut SettingsTree, id: &str) -> Result<()> {
    if get(tree, id).is_none() {
        return Err(Error::FindSignatureError(id.to_owned()));
    }

    let path = signatures_path();
    tree.set(&path.join(NEW_MESSAGE), id);
    tree.set(&path.join(REPLY_FORWARD_MESSAGE), id);
    Ok(())
}

/// Deletes a signature. Default pointers referencing it are cleared
/// as well, so that no pointer dangles.
pub fn delete(tree: &mut SettingsTree, id: &str) -> Result<Signature> {
    let path = signatures_path();
    let signature = get(tree, id).ok_or_else(|| Error::FindSignatureError(id.to_owned()))?;
    tree.delete(&path.join("all").join(id));

    for pointer in [NEW_MESSAGE, REPLY_FORWARD_MESSAGE] {
        let pointer = path.join(pointer);
        if tree.get(&pointer).and_then(id_from_value).as_deref() == Some(id) {
            debug!("clearing dangling signature pointer {}", pointer);
            tree.delete(&pointer);
        }
    }

    Ok(signature)
}

fn generate_id(all: &Map<String, Value>, timestamp: i64) -> String {
    let mut id = timestamp;
    while all.contains_key(&id.to_string()) {
        id += 1;
    }
    id.to_string()
}

/// Legacy documents may hold numeric ids.
fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
