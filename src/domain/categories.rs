//! Categories module.
//!
//! This module contains the export and import of the categories,
//! kept in the persistent settings document rather than in the webapp
//! settings one.

use log::{debug, info};
use serde_json::{json, Value};

use crate::settings::{LoadStatus, SettingsPath, SettingsTree};

pub const CATEGORIES_PATH: &str = "settings.kopano.main.categories";

/// Builds the empty persistent settings document.
pub fn default_document() -> SettingsTree {
    match json!({"settings": {"kopano": {"main": {}}}}) {
        Value::Object(map) => SettingsTree::from_map(map),
        _ => SettingsTree::empty(),
    }
}

/// Loads a persistent settings document, falling back to the empty
/// one when absent or invalid.
pub fn load(raw: Option<&[u8]>) -> (SettingsTree, LoadStatus) {
    SettingsTree::load_or(raw, default_document)
}

fn categories_path() -> SettingsPath {
    SettingsPath::from_static(CATEGORIES_PATH)
}

/// Gets the customized categories. Returns `None` when the user never
/// customized them.
pub fn export(tree: &SettingsTree) -> Option<&Value> {
    let categories = tree.get(&categories_path());
    if categories.is_none() {
        debug!("categories are not customized yet");
    }
    categories
}

/// Replaces the categories of the document.
pub fn import(tree: &mut SettingsTree, categories: Value) {
    info!("restoring categories");
    tree.set(&categories_path(), categories);
}
