//! Recipients module.
//!
//! This module contains the recipient history, the addresses the
//! webapp suggests when composing a message.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{ops, result};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse recipient history")]
    ParseRecipientsError(#[source] serde_json::Error),
    #[error("cannot serialize recipient history")]
    SerializeRecipientsError(#[source] serde_json::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents a recipient of the history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipient {
    pub display_name: String,
    pub smtp_address: String,
    pub email_address: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recipient {
    /// Checks if the pattern is part of the display name or of one of
    /// the addresses.
    pub fn matches(&self, pattern: &str) -> bool {
        self.display_name.contains(pattern)
            || self.smtp_address.contains(pattern)
            || self.email_address.contains(pattern)
    }
}

/// Represents the recipient history document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipientHistory {
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

impl ops::Deref for RecipientHistory {
    type Target = Vec<Recipient>;

    fn deref(&self) -> &Self::Target {
        &self.recipients
    }
}

impl ops::DerefMut for RecipientHistory {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.recipients
    }
}

impl RecipientHistory {
    /// Parses the raw history. An absent history is an empty one.
    pub fn load(raw: Option<&[u8]>) -> Result<Self> {
        match raw {
            Some(raw) => serde_json::from_slice(raw).map_err(Error::ParseRecipientsError),
            None => {
                debug!("no recipient history found");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::SerializeRecipientsError)
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::SerializeRecipientsError)
    }

    /// Removes the recipients matching the pattern and returns them.
    pub fn remove_matching(&mut self, pattern: &str) -> Vec<Recipient> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .recipients
            .drain(..)
            .partition(|recipient| recipient.matches(pattern));
        self.recipients = kept;

        for recipient in &removed {
            info!(
                "removing contact {} [{}]",
                recipient.display_name, recipient.smtp_address
            );
        }

        removed
    }

    /// Removes all the recipients and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.recipients.len();
        self.recipients.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const HISTORY: &[u8] = br#"{"recipients": [
        {"display_name": "Alice", "smtp_address": "alice@localhost", "email_address": "alice@localhost", "count": 3},
        {"display_name": "Bob", "smtp_address": "bob@remote", "email_address": "bob@remote"},
        {"display_name": "Carol", "smtp_address": "carol@localhost", "email_address": "carol@localhost"}
    ]}"#;

    #[test]
    fn remove_by_pattern() {
        let mut history = RecipientHistory::load(Some(HISTORY)).unwrap();
        let removed = history.remove_matching("localhost");

        assert_eq!(
            vec!["Alice", "Carol"],
            removed.iter().map(|r| r.display_name.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(1, history.len());
        assert_eq!("Bob", history[0].display_name);

        assert!(history.remove_matching("nobody").is_empty());
        assert_eq!(1, history.len());
    }

    #[test]
    fn keep_unknown_fields() {
        let history = RecipientHistory::load(Some(HISTORY)).unwrap();
        assert_eq!(Some(&json!(3)), history[0].extra.get("count"));

        let saved = history.save().unwrap();
        assert_eq!(history, RecipientHistory::load(Some(saved.as_slice())).unwrap());
    }

    #[test]
    fn missing_and_cleared_history() {
        let mut history = RecipientHistory::load(None).unwrap();
        assert!(history.is_empty());
        assert_eq!(json!({"recipients": []}), history.to_value().unwrap());

        assert_eq!(0, history.clear());

        let mut history = RecipientHistory::load(Some(HISTORY)).unwrap();
        assert_eq!(3, history.clear());
        assert!(history.is_empty());
    }

    #[test]
    fn invalid_history() {
        assert!(matches!(
            RecipientHistory::load(Some(&b"not json"[..])),
            Err(Error::ParseRecipientsError(_))
        ));
    }
}
