use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

use super::Error;

/// Represents the storage backend of a file account.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum FileBackend {
    Ftp,
    Webdav,
    Owncloud,
    Smb,
}

impl FileBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ftp => "ftp",
            Self::Webdav => "webdav",
            Self::Owncloud => "owncloud",
            Self::Smb => "smb",
        }
    }

    /// Gets the features the plugin enables for the backend.
    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Self::Ftp => &["Streaming"],
            Self::Webdav => &["Quota", "VersionInfo"],
            Self::Owncloud => &["Quota", "Sharing", "VersionInfo"],
            Self::Smb => &["Quota", "Streaming", "VersionInfo"],
        }
    }

    /// Builds the `backend_features` map, flags being the strings
    /// `"true"`.
    pub fn features_map(&self) -> Map<String, Value> {
        self.features()
            .iter()
            .map(|feature| (feature.to_string(), Value::from("true")))
            .collect()
    }
}

impl FromStr for FileBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ftp" => Ok(Self::Ftp),
            "webdav" => Ok(Self::Webdav),
            "owncloud" => Ok(Self::Owncloud),
            "smb" => Ok(Self::Smb),
            _ => Err(Error::UnknownBackend(s.to_owned())),
        }
    }
}

impl fmt::Display for FileBackend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_backends() {
        assert_eq!(FileBackend::Owncloud, "ownCloud".parse().unwrap());
        assert_eq!(FileBackend::Smb, "SMB".parse().unwrap());
        assert!(matches!(
            "dropbox".parse::<FileBackend>(),
            Err(Error::UnknownBackend(backend)) if backend == "dropbox"
        ));
    }

    #[test]
    fn backend_features() {
        assert_eq!(
            json!({"Quota": "true", "Sharing": "true", "VersionInfo": "true"}),
            Value::Object(FileBackend::Owncloud.features_map())
        );
        assert_eq!(
            json!({"Streaming": "true"}),
            Value::Object(FileBackend::Ftp.features_map())
        );
    }
}
