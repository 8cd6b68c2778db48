//! Settings persistence module.
//!
//! This module translates settings trees from and to the raw bytes
//! exchanged with the store.

use log::{debug, trace, warn};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};

use super::{Error, Result, SettingsTree};

/// Represents the way a settings tree has been loaded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LoadStatus {
    /// The raw document has been parsed.
    Parsed,
    /// There was no raw document, the default one is used instead.
    Missing,
    /// The raw document could not be parsed, the default one is used
    /// instead.
    Corrupt(String),
}

impl LoadStatus {
    pub fn is_recovered(&self) -> bool {
        !matches!(self, Self::Parsed)
    }
}

impl SettingsTree {
    /// Loads a webapp settings document, falling back to the
    /// canonical empty document when absent or invalid.
    pub fn load(raw: Option<&[u8]>) -> (Self, LoadStatus) {
        Self::load_or(raw, Self::default)
    }

    /// Loads a settings document, falling back to the given default
    /// document when absent or invalid.
    ///
    /// A document is valid when it is a JSON object holding a
    /// `settings` object.
    pub fn load_or<F>(raw: Option<&[u8]>, default: F) -> (Self, LoadStatus)
    where
        F: FnOnce() -> Self,
    {
        let raw = match raw {
            Some(raw) => raw,
            None => {
                debug!("no settings document found, using default one");
                return (default(), LoadStatus::Missing);
            }
        };

        match serde_json::from_slice::<SettingsTree>(raw) {
            Ok(tree) if tree.has_settings_root() => {
                trace!("settings document: {:?}", tree);
                (tree, LoadStatus::Parsed)
            }
            Ok(_) => {
                warn!("settings document has no settings root, using default one");
                (default(), LoadStatus::Corrupt("missing settings root".into()))
            }
            Err(err) => {
                warn!("cannot parse settings document, using default one: {}", err);
                (default(), LoadStatus::Corrupt(err.to_string()))
            }
        }
    }

    /// Serializes the tree into compact JSON, keeping the keys order.
    pub fn save(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::SerializeError)
    }

    /// Serializes the tree into sorted-keys JSON indented with 4
    /// spaces, so that two backups of the same document are equal.
    pub fn to_sorted_pretty(&self) -> Result<Vec<u8>> {
        to_sorted_pretty(&Value::Object(self.clone().into_map()))
    }
}

/// Serializes any value into sorted-keys JSON indented with 4 spaces.
pub fn to_sorted_pretty(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    sort_keys(value)
        .serialize(&mut serializer)
        .map_err(Error::SerializeError)?;
    Ok(buf)
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(key, value)| (key.clone(), sort_keys(value)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        value => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use concat_with::concat_line;
    use serde_json::json;

    use super::*;

    #[test]
    fn load_missing_document() {
        let (tree, status) = SettingsTree::load(None);
        assert_eq!(SettingsTree::default(), tree);
        assert_eq!(LoadStatus::Missing, status);
        assert!(status.is_recovered());
    }

    #[test]
    fn load_corrupt_documents() {
        let (tree, status) = SettingsTree::load(Some(&b"{not json"[..]));
        assert_eq!(SettingsTree::default(), tree);
        assert!(matches!(status, LoadStatus::Corrupt(_)));

        let (tree, status) = SettingsTree::load(Some(&b"[1, 2]"[..]));
        assert_eq!(SettingsTree::default(), tree);
        assert!(matches!(status, LoadStatus::Corrupt(_)));

        let (tree, status) = SettingsTree::load(Some(&br#"{"other": {}}"#[..]));
        assert_eq!(SettingsTree::default(), tree);
        assert_eq!(
            LoadStatus::Corrupt("missing settings root".into()),
            status
        );
    }

    #[test]
    fn load_save_round_trip() {
        let raw = br#"{"settings":{"zarafa":{"v1":{"main":{"language":"nl_NL","reminder":{"polling_interval":"30"}},"contexts":{"mail":{"safe_senders_list":["a.com"],"signatures":{"all":{"1":{"name":"Default","content":"<p>Hi</p>","isHTML":true}}}}}}}}}"#;
        let (tree, status) = SettingsTree::load(Some(&raw[..]));
        assert_eq!(LoadStatus::Parsed, status);

        let saved = tree.save().unwrap();
        assert_eq!(raw.to_vec(), saved);
        assert_eq!((tree, LoadStatus::Parsed), SettingsTree::load(Some(saved.as_slice())));
    }

    #[test]
    fn sorted_pretty_output() {
        let (tree, _) = SettingsTree::load(Some(
            &br#"{"settings":{"b":[{"y":1,"x":2}],"a":true}}"#[..],
        ));
        let output = String::from_utf8(tree.to_sorted_pretty().unwrap()).unwrap();
        assert_eq!(
            concat_line!(
                "{",
                "    \"settings\": {",
                "        \"a\": true,",
                "        \"b\": [",
                "            {",
                "                \"x\": 2,",
                "                \"y\": 1",
                "            }",
                "        ]",
                "    }",
                "}",
            )
            .trim_end(),
            output
        );
        assert_eq!(json!({"x": 2, "y": 1}), sort_keys(&json!({"y": 1, "x": 2})));
    }
}
