//! Settings path module.
//!
//! This module contains the representation of a dotted key path
//! addressing one location of the settings tree.

use std::{fmt, ops, str::FromStr};

use super::{Error, Result};

/// Represents a dotted path like `settings.zarafa.v1.main.language`.
///
/// Each segment addresses one level of nesting. There is no way to
/// escape a literal dot inside a key.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SettingsPath(Vec<String>);

impl SettingsPath {
    /// Parses a dotted path. Segments are trimmed, and the path is
    /// rejected if it contains no segment or an empty one.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path
            .split('.')
            .map(|segment| segment.trim().to_owned())
            .collect();

        if segments.iter().any(String::is_empty) {
            return Err(Error::InvalidPath(path.to_owned()));
        }

        Ok(Self(segments))
    }

    /// Builds a path from a dotted constant known to be valid.
    pub(crate) fn from_static(path: &'static str) -> Self {
        Self(path.split('.').map(ToOwned::to_owned).collect())
    }

    /// Builds a path from already split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let segments: Vec<String> = segments.into_iter().map(|s| s.to_string()).collect();
        if segments.is_empty() || segments.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidPath(segments.join(".")));
        }
        Ok(Self(segments))
    }

    /// Returns a new path with the given segment appended.
    pub fn join<S: ToString>(&self, segment: S) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    /// Splits the path into its parent segments and its last one.
    pub fn split_last(&self) -> (&[String], &str) {
        match self.0.split_last() {
            Some((last, parents)) => (parents, last),
            // parsing never builds an empty path
            None => (&[], ""),
        }
    }
}

impl ops::Deref for SettingsPath {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for SettingsPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for SettingsPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SettingsPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dotted_path() {
        let path = SettingsPath::parse("settings.zarafa.v1").unwrap();
        assert_eq!(vec!["settings", "zarafa", "v1"], path.to_vec());

        let path = SettingsPath::parse(" settings . zarafa.v1 ").unwrap();
        assert_eq!("settings.zarafa.v1", path.to_string());

        let path = SettingsPath::parse("theme").unwrap();
        assert_eq!(1, path.len());
    }

    #[test]
    fn reject_empty_segments() {
        assert!(matches!(
            SettingsPath::parse(""),
            Err(Error::InvalidPath(path)) if path == ""
        ));
        assert!(matches!(SettingsPath::parse("  "), Err(Error::InvalidPath(_))));
        assert!(matches!(SettingsPath::parse("a..b"), Err(Error::InvalidPath(_))));
        assert!(matches!(SettingsPath::parse("a.b."), Err(Error::InvalidPath(_))));
        assert!(SettingsPath::from_segments(Vec::<String>::new()).is_err());
    }

    #[test]
    fn split_and_join() {
        let path = SettingsPath::parse("a.b").unwrap().join("c");
        let (parents, last) = path.split_last();
        assert_eq!(["a".to_owned(), "b".to_owned()], parents);
        assert_eq!("c", last);
    }
}
