//! Shared store module.
//!
//! This module contains the editor of the shared stores of the
//! hierarchy context, keyed by owner then by folder type:
//!
//! ```json
//! "shared_stores": {
//!   "<user>": {"<folder type>": {"folder_type": "…", "show_subfolders": false}}
//! }
//! ```

use log::{debug, info};
use serde_json::{json, Value};

use crate::{SettingsPath, SettingsTree};

use super::{FolderType, Result};

pub const SHARED_STORES_PATH: &str = "settings.zarafa.v1.contexts.hierarchy.shared_stores";

/// Represents one folder of another user shown in the hierarchy.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SharedStore {
    pub user: String,
    pub folder_type: String,
    pub show_subfolders: bool,
}

fn shared_stores_path() -> SettingsPath {
    SettingsPath::from_static(SHARED_STORES_PATH)
}

/// Lists the shared folders of the tree, one row per user and folder
/// type.
pub fn list(tree: &SettingsTree) -> Vec<SharedStore> {
    let stores = match tree.get_map(&shared_stores_path()) {
        Some(stores) => stores,
        None => return Vec::new(),
    };

    stores
        .iter()
        .filter_map(|(user, folders)| Some((user, folders.as_object()?)))
        .flat_map(|(user, folders)| {
            folders.iter().map(move |(folder_type, folder)| SharedStore {
                user: user.clone(),
                folder_type: folder_type.clone(),
                show_subfolders: folder
                    .get("show_subfolders")
                    .and_then(Value::as_bool)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// Shows a folder of the target user. The folder type is validated
/// before the tree is touched. Other folders of the same user are
/// kept.
pub fn add(
    tree: &mut SettingsTree,
    target_user: &str,
    folder_type: &str,
    show_subfolders: bool,
) -> Result<()> {
    let folder_type: FolderType = folder_type.parse()?;

    info!("adding {} folder of {} to shared stores", folder_type, target_user);
    tree.map_mut(&shared_stores_path().join(target_user)).insert(
        folder_type.to_string(),
        json!({"folder_type": folder_type.as_str(), "show_subfolders": show_subfolders}),
    );

    Ok(())
}

/// Hides one folder of the target user, or all of them when no
/// folder type is given. Returns false when there was nothing to
/// remove.
pub fn remove(tree: &mut SettingsTree, target_user: &str, folder_type: Option<&str>) -> Result<bool> {
    let folder_type = folder_type.map(str::parse::<FolderType>).transpose()?;

    let mut path = shared_stores_path().join(target_user);
    if let Some(folder_type) = folder_type {
        path = path.join(folder_type);
    }

    let removed = tree.delete(&path).is_some();
    if removed {
        info!("removing shared store {}", path);
    } else {
        debug!("no shared store found at {}", path);
    }

    Ok(removed)
}
