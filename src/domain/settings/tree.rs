//! Settings tree module.
//!
//! This module contains the in-memory representation of a settings
//! document: a mapping of string keys to either leaf values or
//! nested mappings, addressed by [`SettingsPath`].

use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::ops;

use super::SettingsPath;

/// Key every settings document holds at its root.
pub const ROOT_KEY: &str = "settings";

/// Path of the webapp root settings node.
pub const ROOT_PATH: &str = "settings.zarafa.v1";

/// Represents a settings document.
///
/// Insertion order is kept so that documents serialize the way they
/// were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsTree(Map<String, Value>);

impl Default for SettingsTree {
    /// Builds the canonical empty webapp document.
    fn default() -> Self {
        let doc = json!({"settings": {"zarafa": {"v1": {"contexts": {"mail": {}}}}}});
        match doc {
            Value::Object(map) => Self(map),
            _ => Self::empty(),
        }
    }
}

impl SettingsTree {
    /// Builds a tree without any key, mostly useful as a merge
    /// overlay.
    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Checks that the tree holds a `settings` mapping at its root.
    pub fn has_settings_root(&self) -> bool {
        self.0.get(ROOT_KEY).map(Value::is_object).unwrap_or(false)
    }

    /// Gets the value at the given path. Returns `None` when any
    /// intermediate level is missing or is not a mapping.
    pub fn get(&self, path: &SettingsPath) -> Option<&Value> {
        let (parents, last) = path.split_last();
        let mut map = &self.0;
        for segment in parents {
            map = map.get(segment)?.as_object()?;
        }
        map.get(last)
    }

    pub fn get_mut(&mut self, path: &SettingsPath) -> Option<&mut Value> {
        let (parents, last) = path.split_last();
        let mut map = &mut self.0;
        for segment in parents {
            map = map.get_mut(segment)?.as_object_mut()?;
        }
        map.get_mut(last)
    }

    /// Gets the string value at the given path, if any.
    pub fn get_str(&self, path: &SettingsPath) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Gets the mapping at the given path, if any.
    pub fn get_map(&self, path: &SettingsPath) -> Option<&Map<String, Value>> {
        self.get(path).and_then(Value::as_object)
    }

    /// Sets the value at the given path and returns the previous one.
    ///
    /// Every missing intermediate level is created as an empty
    /// mapping. An intermediate level holding a leaf is replaced by a
    /// mapping, and the final value overwrites whatever was there.
    pub fn set<V: Into<Value>>(&mut self, path: &SettingsPath, value: V) -> Option<Value> {
        let (parents, last) = path.split_last();
        trace!("setting value at {}", path);
        vivify(&mut self.0, parents).insert(last.to_owned(), value.into())
    }

    /// Gets the mapping at the given path, creating it (and all its
    /// parents) when missing.
    pub fn map_mut(&mut self, path: &SettingsPath) -> &mut Map<String, Value> {
        vivify(&mut self.0, path)
    }

    /// Removes the value at the given path and returns it. Does
    /// nothing if any level of the path is missing.
    pub fn delete(&mut self, path: &SettingsPath) -> Option<Value> {
        let (parents, last) = path.split_last();
        let mut map = &mut self.0;
        for segment in parents {
            map = map.get_mut(segment)?.as_object_mut()?;
        }
        trace!("deleting value at {}", path);
        map.remove(last)
    }

    /// Merges the overlay into this tree in place.
    pub fn merge(&mut self, overlay: &SettingsTree) {
        self.0 = merge_maps(&self.0, &overlay.0);
    }
}

/// Deeply merges two trees into a new one.
///
/// When a key exists on both sides and both values are mappings, they
/// are merged recursively. On any other conflict the overlay value
/// wins. Keys present on one side only are kept as is.
pub fn deep_merge(base: &SettingsTree, overlay: &SettingsTree) -> SettingsTree {
    SettingsTree(merge_maps(&base.0, &overlay.0))
}

fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();

    for (key, value) in overlay {
        let value = match (merged.get(key), value) {
            (Some(Value::Object(base)), Value::Object(overlay)) => {
                Value::Object(merge_maps(base, overlay))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), value);
    }

    merged
}

fn vivify<'a>(root: &'a mut Map<String, Value>, segments: &[String]) -> &'a mut Map<String, Value> {
    let mut map = root;
    for segment in segments {
        let value = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !value.is_object() {
            *value = Value::Object(Map::new());
        }
        map = match value {
            Value::Object(map) => map,
            _ => unreachable!("value has just been turned into an object"),
        };
    }
    map
}

impl ops::Deref for SettingsTree {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for SettingsTree {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for SettingsTree {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
