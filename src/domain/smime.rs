//! S/MIME module.
//!
//! This module contains the representation of the S/MIME certificates
//! kept in a mailbox. Bodies are opaque: they are never parsed nor
//! verified here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, ops};

/// Represents the kind of a certificate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateKind {
    /// Certificate of a correspondent, used to encrypt.
    Public,
    /// PKCS#12 bundle of the user, used to sign and decrypt.
    Private,
}

impl CertificateKind {
    /// Gets the extension of the exported file.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Public => "pub",
            Self::Private => "pfx",
        }
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// Represents a certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub kind: CertificateKind,
    /// Email address the certificate has been issued to.
    pub subject: String,
    pub serial: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl Certificate {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }

    /// Builds the export file name: `<subject>-<serial>.<pfx|pub>`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.subject.replace(|c| c == '/' || c == '\\', "-"),
            self.serial,
            self.kind.extension()
        )
    }
}

/// Represents the list of certificates of a mailbox.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Certificates(pub Vec<Certificate>);

impl ops::Deref for Certificates {
    type Target = Vec<Certificate>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Certificates {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Certificates {
    /// Gets the public certificates which expired before the given
    /// date. Private ones are never considered expired, the user may
    /// still need them to decrypt old messages.
    pub fn expired_public(&self, now: DateTime<Utc>) -> Vec<&Certificate> {
        self.iter()
            .filter(|cert| cert.kind == CertificateKind::Public && cert.is_expired(now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn certificate(id: &str, kind: CertificateKind, valid_until: DateTime<Utc>) -> Certificate {
        Certificate {
            id: id.into(),
            kind,
            subject: "alice@localhost".into(),
            serial: "1234".into(),
            valid_from: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            valid_until,
            body: b"body".to_vec(),
        }
    }

    #[test]
    fn export_file_names() {
        let until = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            "alice@localhost-1234.pfx",
            certificate("1", CertificateKind::Private, until).file_name()
        );
        assert_eq!(
            "alice@localhost-1234.pub",
            certificate("2", CertificateKind::Public, until).file_name()
        );
    }

    #[test]
    fn expired_public_certificates() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let certificates = Certificates(vec![
            certificate("1", CertificateKind::Public, now - Duration::days(1)),
            certificate("2", CertificateKind::Public, now + Duration::days(1)),
            certificate("3", CertificateKind::Private, now - Duration::days(1)),
        ]);

        let expired = certificates.expired_public(now);
        assert_eq!(1, expired.len());
        assert_eq!("1", expired[0].id);
    }
}
