//! Backup module.
//!
//! This module contains the session commands exchanging documents
//! with files: settings, signatures, categories, recipient history
//! and S/MIME certificates.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    categories, settings, signature, Certificate, CertificateKind, Property, Recipient,
    RecipientHistory, Session, Signature, SignatureFile, SettingsTree,
};

use super::{Error, Result};

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| Error::ReadBackupFileError(err, path.to_owned()))
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|err| Error::WriteBackupFileError(err, path.to_owned()))
}

impl Session<'_> {
    fn backup_path(&self, file: Option<&Path>, default_name: String) -> PathBuf {
        match file {
            Some(file) => file.to_owned(),
            None => self.config().backup_file_path(default_name),
        }
    }

    /// Replaces the webapp settings of the user by the canonical
    /// empty document.
    pub fn reset_settings(&self, user: &str) -> Result<()> {
        info!("{}: removing webapp settings", user);
        self.write_settings(user, &SettingsTree::default())
    }

    /// Writes the webapp settings of the user to `<user>.json` in the
    /// backup directory, with sorted keys.
    pub fn backup_settings(&self, user: &str) -> Result<PathBuf> {
        let (tree, _) = self.read_settings(user)?;
        let path = self.config().backup_file_path(format!("{}.json", user));

        info!("{}: creating backup of webapp settings to {:?}", user, path);
        write_file(&path, &tree.to_sorted_pretty()?)?;
        Ok(path)
    }

    /// Restores the webapp settings of the user from the given file,
    /// or from `<user>.json` in the backup directory.
    pub fn restore_settings(&self, user: &str, file: Option<&Path>) -> Result<()> {
        let path = self.backup_path(file, format!("{}.json", user));
        let tree: SettingsTree = serde_json::from_slice(&read_file(&path)?)
            .map_err(|err| Error::ParseBackupFileError(err, path.to_owned()))?;

        if !tree.has_settings_root() {
            return Err(Error::InvalidSettingsBackupError(path));
        }

        info!("{}: restoring webapp settings from {:?}", user, path);
        self.write_settings(user, &tree)
    }

    /// Dumps every signature of the user to
    /// `<user>_<name>_<id>.html` in the backup directory.
    pub fn backup_signatures(&self, user: &str) -> Result<Vec<PathBuf>> {
        let (tree, _) = self.read_settings(user)?;
        let export = signature::export_all(&tree);

        if export.is_empty() {
            info!("{}: has no signature", user);
        }

        let mut paths = Vec::new();
        for entry in export.iter() {
            let path = self.config().backup_file_path(entry.file_name(user));
            info!("{}: dumping signature {:?} to {:?}", user, entry.name, path);
            write_file(&path, entry.content.as_bytes())?;
            paths.push(path);
        }

        Ok(paths)
    }

    /// Adds the signature stored in the given HTML file and returns
    /// its id.
    ///
    /// When replacing, the name and the id of the signature are taken
    /// from the file name (see [`SignatureFile`]) and the existing
    /// signature with that id is overwritten. Otherwise the file name
    /// without extension becomes the name and a new id is allocated.
    pub fn restore_signature(
        &self,
        user: &str,
        file: &Path,
        replace: bool,
        set_as_default: bool,
    ) -> Result<String> {
        let (name, id) = if replace {
            let file = SignatureFile::parse(file)?;
            (file.name, Some(file.id))
        } else {
            (SignatureFile::plain_name(file)?, None)
        };

        let content = String::from_utf8_lossy(&read_file(file)?).to_string();
        let new_signature = Signature::new(name, content);

        self.update_settings(user, |tree| {
            Ok(signature::upsert(
                tree,
                id.as_deref(),
                &new_signature,
                set_as_default,
            ))
        })
    }

    /// Writes the categories of the user to `<user>-categories.json`
    /// in the backup directory. Returns `None` when the categories
    /// were never customized.
    pub fn export_categories(&self, user: &str) -> Result<Option<PathBuf>> {
        let raw = self.store().read_property(user, Property::PersistentSettings)?;
        let (tree, _) = categories::load(raw.as_deref());

        let exported = match categories::export(&tree) {
            Some(exported) => exported,
            None => {
                info!("{}: categories are not customized yet, nothing to export", user);
                return Ok(None);
            }
        };

        let path = self
            .config()
            .backup_file_path(format!("{}-categories.json", user));
        info!("{}: creating categories backup to {:?}", user, path);
        write_file(&path, &settings::to_sorted_pretty(exported)?)?;
        Ok(Some(path))
    }

    /// Restores the categories of the user from the given file, or
    /// from `<user>-categories.json` in the backup directory. The rest
    /// of the persistent settings is kept.
    pub fn import_categories(&self, user: &str, file: Option<&Path>) -> Result<()> {
        let path = self.backup_path(file, format!("{}-categories.json", user));
        let data: Value = serde_json::from_slice(&read_file(&path)?)
            .map_err(|err| Error::ParseBackupFileError(err, path.to_owned()))?;

        let raw = self.store().read_property(user, Property::PersistentSettings)?;
        let (mut tree, _) = categories::load(raw.as_deref());
        categories::import(&mut tree, data);

        info!("{}: restoring categories from {:?}", user, path);
        self.store()
            .write_property(user, Property::PersistentSettings, &tree.save()?)?;
        Ok(())
    }

    /// Reads the recipient history of the user.
    pub fn recipient_history(&self, user: &str) -> Result<RecipientHistory> {
        let raw = self.store().read_property(user, Property::RecipientHistory)?;
        Ok(RecipientHistory::load(raw.as_deref())?)
    }

    fn write_recipient_history(&self, user: &str, history: &RecipientHistory) -> Result<()> {
        self.store()
            .write_property(user, Property::RecipientHistory, &history.save()?)?;
        Ok(())
    }

    /// Writes the recipient history of the user to
    /// `<user>-recipients.json` in the backup directory.
    pub fn backup_recipients(&self, user: &str) -> Result<PathBuf> {
        let history = self.recipient_history(user)?;
        let path = self
            .config()
            .backup_file_path(format!("{}-recipients.json", user));

        info!("{}: creating recipient history backup to {:?}", user, path);
        write_file(&path, &settings::to_sorted_pretty(&history.to_value()?)?)?;
        Ok(path)
    }

    /// Restores the recipient history of the user from the given
    /// file, or from `<user>-recipients.json` in the backup directory.
    pub fn restore_recipients(&self, user: &str, file: Option<&Path>) -> Result<()> {
        let path = self.backup_path(file, format!("{}-recipients.json", user));
        let history: RecipientHistory = serde_json::from_slice(&read_file(&path)?)
            .map_err(|err| Error::ParseBackupFileError(err, path.to_owned()))?;

        info!("{}: restoring recipient history from {:?}", user, path);
        self.write_recipient_history(user, &history)
    }

    /// Removes the recipients whose name or addresses contain the
    /// pattern, and returns them. A dry run writes nothing.
    pub fn remove_recipients(&self, user: &str, pattern: &str, dry_run: bool) -> Result<Vec<Recipient>> {
        let mut history = self.recipient_history(user)?;
        let removed = history.remove_matching(pattern);

        if dry_run {
            debug!("{}: dry run, keeping recipient history", user);
        } else if !removed.is_empty() {
            self.write_recipient_history(user, &history)?;
        }

        Ok(removed)
    }

    /// Empties the recipient history of the user and returns how many
    /// recipients it held. A dry run writes nothing.
    pub fn remove_all_recipients(&self, user: &str, dry_run: bool) -> Result<usize> {
        let mut history = self.recipient_history(user)?;
        let count = history.clear();

        if dry_run {
            debug!("{}: dry run, keeping recipient history", user);
        } else {
            info!("{}: removing {} recipients from history", user, count);
            self.write_recipient_history(user, &history)?;
        }

        Ok(count)
    }

    /// Imports a certificate into the mailbox of the user, replacing
    /// the one with the same id.
    pub fn import_certificate(&self, user: &str, certificate: &Certificate) -> Result<()> {
        info!(
            "{}: importing {} certificate {}",
            user, certificate.kind, certificate.subject
        );
        self.store().add_certificate(user, certificate)?;
        Ok(())
    }

    /// Writes the certificates of the user to
    /// `<subject>-<serial>.<pfx|pub>` in the backup directory. Public
    /// certificates are only exported when asked for.
    pub fn export_certificates(&self, user: &str, include_public: bool) -> Result<Vec<PathBuf>> {
        let certificates = self.store().list_certificates(user)?;
        if certificates.is_empty() {
            info!("{}: no certificates found", user);
        }

        let mut paths = Vec::new();
        for cert in certificates.iter() {
            if cert.kind == CertificateKind::Public && !include_public {
                continue;
            }

            let path = self.config().backup_file_path(cert.file_name());
            info!(
                "{}: found {} certificate {} (serial: {})",
                user, cert.kind, cert.subject, cert.serial
            );
            write_file(&path, &cert.body)?;
            paths.push(path);
        }

        Ok(paths)
    }

    /// Deletes the public certificates of the user that are expired.
    pub fn remove_expired_certificates(&self, user: &str) -> Result<Vec<Certificate>> {
        self.remove_certificates_expired_at(user, Utc::now())
    }

    /// Deletes the public certificates of the user that expired
    /// before the given date, and returns them.
    pub fn remove_certificates_expired_at(
        &self,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Certificate>> {
        let certificates = self.store().list_certificates(user)?;
        let expired: Vec<Certificate> = certificates
            .expired_public(now)
            .into_iter()
            .cloned()
            .collect();

        for cert in &expired {
            info!(
                "{}: deleting public certificate {} ({})",
                user, cert.subject, cert.valid_until
            );
            self.store().delete_certificate(user, &cert.id)?;
        }

        Ok(expired)
    }
}
