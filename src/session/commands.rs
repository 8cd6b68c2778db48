//! Commands module.
//!
//! This module contains the session commands editing the webapp
//! settings of a user: options, signatures, send-as identities,
//! shared stores and file accounts.

use log::{debug, info};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    files, options, sendas, shared_store, signature, Assignment, FileAccount, FileAccountEntry,
    HtmlEditor, IconSet, SendAs, SendAsChanges, Session, SharedStore, Signature, ValueKind,
};

use super::Result;

impl Session<'_> {
    /// Sets the language of the user. `userdefined` stands for the
    /// language of the user directory. Returns the stored language.
    pub fn set_language(&self, user: &str, language: &str) -> Result<String> {
        let language = if language == options::USER_DEFINED_LANGUAGE {
            let profile = self.store().user_profile(user)?;
            options::resolve_language(
                language,
                profile.language.as_deref(),
                self.config().fallback_language(),
            )
        } else {
            language.to_owned()
        };

        self.update_settings(user, |tree| {
            options::set_language(tree, &language);
            Ok(language.clone())
        })
    }

    pub fn set_theme(&self, user: &str, theme: &str) -> Result<()> {
        self.update_settings(user, |tree| {
            options::set_theme(tree, theme);
            Ok(())
        })
    }

    pub fn set_icon_set(&self, user: &str, icon_set: &str) -> Result<IconSet> {
        let icon_set: IconSet = icon_set.parse()?;
        self.update_settings(user, |tree| {
            options::set_icon_set(tree, icon_set);
            Ok(icon_set)
        })
    }

    pub fn set_html_editor(&self, user: &str, editor: &str) -> Result<HtmlEditor> {
        let editor: HtmlEditor = editor.parse()?;
        self.update_settings(user, |tree| {
            options::set_html_editor(tree, editor);
            Ok(editor)
        })
    }

    pub fn set_free_busy_range(&self, user: &str, months: &str) -> Result<i64> {
        self.update_settings(user, |tree| Ok(options::set_free_busy_range(tree, months)?))
    }

    pub fn set_polling_interval(&self, user: &str, seconds: &str) -> Result<i64> {
        self.update_settings(user, |tree| {
            Ok(options::set_polling_interval(tree, seconds)?)
        })
    }

    pub fn set_calendar_resolution(&self, user: &str, minutes: &str) -> Result<i64> {
        self.update_settings(user, |tree| {
            Ok(options::set_calendar_resolution(tree, minutes)?)
        })
    }

    pub fn add_safe_senders(&self, user: &str, senders: &str) -> Result<Vec<String>> {
        self.update_settings_if(user, |tree| {
            let added = options::add_safe_senders(tree, senders);
            let changed = !added.is_empty();
            Ok((added, changed))
        })
    }

    pub fn remove_state(&self, user: &str) -> Result<()> {
        self.update_settings(user, |tree| {
            options::remove_state(tree);
            Ok(())
        })
    }

    /// Merges a `path = value` expression into the settings of the
    /// user.
    pub fn inject(&self, user: &str, expr: &str, kind: ValueKind) -> Result<Assignment> {
        self.update_settings(user, |tree| Ok(options::inject(tree, expr, kind)?))
    }

    /// Removes the value at the given dotted path from the settings
    /// of the user, and returns it.
    pub fn remove_option(&self, user: &str, path: &str) -> Result<Option<Value>> {
        self.update_settings_if(user, |tree| {
            let removed = options::remove_option(tree, path)?;
            let changed = removed.is_some();
            Ok((removed, changed))
        })
    }

    /// Lists the signatures of the user as `(id, signature)` pairs.
    pub fn list_signatures(&self, user: &str) -> Result<Vec<(String, Signature)>> {
        let (tree, _) = self.read_settings(user)?;
        let signatures = signature::export_all(&tree)
            .iter()
            .map(|entry| {
                (
                    entry.id.to_owned(),
                    Signature::new(entry.name, entry.content),
                )
            })
            .collect();
        Ok(signatures)
    }

    pub fn set_default_signature(&self, user: &str, id: &str) -> Result<()> {
        info!("{}: changing default signature to {}", user, id);
        self.update_settings(user, |tree| Ok(signature::set_default(tree, id)?))
    }

    pub fn delete_signature(&self, user: &str, id: &str) -> Result<Signature> {
        info!("{}: deleting signature {}", user, id);
        self.update_settings(user, |tree| Ok(signature::delete(tree, id)?))
    }

    pub fn list_shared_stores(&self, user: &str) -> Result<Vec<SharedStore>> {
        let (tree, _) = self.read_settings(user)?;
        Ok(shared_store::list(&tree))
    }

    /// Shows a folder of the target user in the hierarchy of the
    /// user.
    pub fn add_shared_store(
        &self,
        user: &str,
        target_user: &str,
        folder_type: &str,
        show_subfolders: bool,
    ) -> Result<()> {
        self.update_settings(user, |tree| {
            Ok(shared_store::add(tree, target_user, folder_type, show_subfolders)?)
        })
    }

    /// Hides one folder, or all the folders, of the target user.
    /// Returns false when there was nothing to remove, in which case
    /// nothing is written.
    pub fn remove_shared_store(
        &self,
        user: &str,
        target_user: &str,
        folder_type: Option<&str>,
    ) -> Result<bool> {
        self.update_settings_if(user, |tree| {
            let removed = shared_store::remove(tree, target_user, folder_type)?;
            if !removed {
                info!("{}: no additional stores found for {}", user, target_user);
            }
            Ok((removed, removed))
        })
    }

    pub fn list_sendas(&self, user: &str) -> Result<Vec<SendAs>> {
        let (tree, _) = self.read_settings(user)?;
        Ok(sendas::list(&tree)?)
    }

    /// Adds a sent-from address to the user and returns its row id.
    pub fn add_sendas(
        &self,
        user: &str,
        display_name: &str,
        smtp_address: &str,
        forward_mail: bool,
        new_mail: bool,
        reply_mail: bool,
    ) -> Result<i64> {
        let entryid = self.store().one_off_entry_id(display_name, smtp_address)?;
        let new_sendas = SendAs::new(display_name, smtp_address, entryid)
            .forward_mail(forward_mail)
            .new_mail(new_mail)
            .reply_mail(reply_mail);

        self.update_settings(user, |tree| Ok(sendas::add(tree, new_sendas)?))
    }

    /// Adds one sent-from address per alias of the user, and returns
    /// their row ids.
    pub fn add_sendas_aliases(&self, user: &str) -> Result<Vec<i64>> {
        let profile = self.store().user_profile(user)?;
        let aliases = sendas::secondary_addresses(&profile.addresses)
            .into_iter()
            .map(|alias| -> Result<(String, String)> {
                let entryid = self.store().one_off_entry_id(&alias, &alias)?;
                Ok((alias, entryid))
            })
            .collect::<Result<Vec<_>>>()?;

        if aliases.is_empty() {
            info!("{}: has no alias address", user);
            return Ok(Vec::new());
        }

        info!("{}: writing alias addresses to sendas list", user);
        self.update_settings(user, |tree| Ok(sendas::add_from_aliases(tree, aliases)?))
    }

    /// Changes a sent-from address of the user. The settings are only
    /// written when something actually changed.
    pub fn update_sendas(&self, user: &str, rowid: i64, changes: &SendAsChanges) -> Result<bool> {
        self.update_settings_if(user, |tree| {
            let changed = sendas::update(tree, rowid, changes)?;
            Ok((changed, changed))
        })
    }

    pub fn delete_sendas(&self, user: &str, rowid: i64) -> Result<Option<SendAs>> {
        self.update_settings_if(user, |tree| {
            let deleted = sendas::delete(tree, rowid)?;
            if deleted.is_none() {
                debug!("{}: no sendas row {}", user, rowid);
            }
            let changed = deleted.is_some();
            Ok((deleted, changed))
        })
    }

    pub fn list_file_accounts(&self, user: &str) -> Result<Vec<FileAccountEntry>> {
        let (tree, _) = self.read_settings(user)?;
        Ok(files::list(&tree)?)
    }

    /// Adds a file account to the user and returns its id. When an
    /// encode command is configured, the text options of the backend
    /// are piped through it first.
    pub fn add_file_account(&self, user: &str, mut account: FileAccount) -> Result<Uuid> {
        if let Some(cmd) = self.config().encode_cmd.as_deref() {
            account.encode(cmd)?;
        }

        self.update_settings(user, |tree| Ok(files::add(tree, &account)))
    }

    pub fn remove_file_account(&self, user: &str, id: &str) -> Result<bool> {
        self.update_settings_if(user, |tree| {
            let removed = files::remove(tree, id);
            Ok((removed, removed))
        })
    }
}
