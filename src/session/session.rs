//! Session module.
//!
//! This module contains the read-modify-write cycle of the users
//! documents, and the batch processing over several users.

use log::{debug, info, warn};

use crate::{AdminConfig, LoadStatus, Property, SettingsTree, Store};

use super::{Error, Result};

/// Represents the users a command applies to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UserSelection {
    /// Every user of the store.
    All,
    /// The given users, in the given order.
    Users(Vec<String>),
}

impl<S: ToString> FromIterator<S> for UserSelection {
    fn from_iter<I: IntoIterator<Item = S>>(users: I) -> Self {
        Self::Users(users.into_iter().map(|user| user.to_string()).collect())
    }
}

/// Represents a session: a store and the configuration every command
/// runs with.
///
/// Documents are never cached: each command reads the document of
/// the user, changes it in memory, then writes it back as a whole.
/// There is no locking, the last writer wins.
#[derive(Clone, Copy)]
pub struct Session<'a> {
    store: &'a dyn Store,
    config: &'a AdminConfig,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a dyn Store, config: &'a AdminConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &'a dyn Store {
        self.store
    }

    pub fn config(&self) -> &'a AdminConfig {
        self.config
    }

    /// Reads the webapp settings of the user. A missing or invalid
    /// document is replaced by the canonical empty one.
    pub fn read_settings(&self, user: &str) -> Result<(SettingsTree, LoadStatus)> {
        let raw = self.store.read_property(user, Property::WebappSettings)?;
        let (tree, status) = SettingsTree::load(raw.as_deref());

        match &status {
            LoadStatus::Parsed => (),
            LoadStatus::Missing => {
                info!("{}: has no webapp settings, creating empty config tree", user)
            }
            LoadStatus::Corrupt(reason) => warn!(
                "{}: has no valid webapp settings ({}), creating empty config tree",
                user, reason
            ),
        }

        Ok((tree, status))
    }

    /// Writes the webapp settings of the user as a whole.
    pub fn write_settings(&self, user: &str, tree: &SettingsTree) -> Result<()> {
        let data = tree.save()?;
        debug!("{}: writing {} bytes of webapp settings", user, data.len());
        self.store
            .write_property(user, Property::WebappSettings, &data)?;
        Ok(())
    }

    /// Reads the webapp settings of the user, applies the given
    /// change then writes them back. Nothing is written when the
    /// change fails.
    pub fn update_settings<T, F>(&self, user: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut SettingsTree) -> Result<T>,
    {
        self.update_settings_if(user, |tree| Ok((f(tree)?, true)))
    }

    /// Same as [`Session::update_settings`], except that the change
    /// also tells whether the document needs to be written. A change
    /// dropping the `settings` root is refused and nothing is
    /// written.
    pub(super) fn update_settings_if<T, F>(&self, user: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut SettingsTree) -> Result<(T, bool)>,
    {
        let (mut tree, _) = self.read_settings(user)?;
        let (output, changed) = f(&mut tree)?;

        if changed && !tree.has_settings_root() {
            return Err(Error::MissingSettingsRootError(user.to_owned()));
        }

        if changed {
            self.write_settings(user, &tree)?;
        } else {
            debug!("{}: nothing changed, skipping write", user);
        }

        Ok(output)
    }

    /// Resolves the selection into a list of user names.
    pub fn users(&self, selection: &UserSelection) -> Result<Vec<String>> {
        match selection {
            UserSelection::All => Ok(self.store.list_users()?),
            UserSelection::Users(users) => Ok(users.clone()),
        }
    }

    /// Runs the given command for each user, sequentially and in
    /// order. A failing user does not stop the batch: the outcome of
    /// each user is returned next to its name.
    pub fn for_each_user<T, F>(&self, users: &[String], mut f: F) -> Vec<(String, Result<T>)>
    where
        F: FnMut(&str) -> Result<T>,
    {
        users
            .iter()
            .map(|user| {
                let res = f(user);
                if let Err(err) = &res {
                    warn!("{}: {}", user, err);
                }
                (user.to_owned(), res)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{settings, MemoryStore, SettingsPath, UserProfile};

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_user("alice", UserProfile::default());
        store.add_user("bob", UserProfile::default());
        store
    }

    #[test]
    fn read_missing_and_corrupt_settings() {
        let store = store();
        let config = AdminConfig::default();
        let session = Session::new(&store, &config);

        let (tree, status) = session.read_settings("alice").unwrap();
        assert_eq!(LoadStatus::Missing, status);
        assert_eq!(SettingsTree::default(), tree);

        store
            .write_property("alice", Property::WebappSettings, b"{oops")
            .unwrap();
        let (tree, status) = session.read_settings("alice").unwrap();
        assert!(matches!(status, LoadStatus::Corrupt(_)));
        assert_eq!(SettingsTree::default(), tree);
    }

    #[test]
    fn failed_update_writes_nothing() {
        let store = store();
        let config = AdminConfig::default();
        let session = Session::new(&store, &config);

        let res: Result<()> = session.update_settings("alice", |tree| {
            tree.set(&SettingsPath::parse("settings.a").unwrap(), json!(1));
            Err(settings::Error::InvalidPath("".into()).into())
        });
        assert!(matches!(res, Err(Error::SettingsError(_))));
        assert_eq!(
            None,
            store.read_property("alice", Property::WebappSettings).unwrap()
        );

        session
            .update_settings("alice", |tree| {
                tree.set(&SettingsPath::parse("settings.a").unwrap(), json!(1));
                Ok(())
            })
            .unwrap();
        let (tree, status) = session.read_settings("alice").unwrap();
        assert_eq!(LoadStatus::Parsed, status);
        assert_eq!(
            Some(&json!(1)),
            tree.get(&SettingsPath::parse("settings.a").unwrap())
        );
    }

    #[test]
    fn update_dropping_settings_root_writes_nothing() {
        let store = store();
        let config = AdminConfig::default();
        let session = Session::new(&store, &config);

        session
            .update_settings("alice", |tree| {
                tree.set(&SettingsPath::parse("settings.a").unwrap(), json!(1));
                Ok(())
            })
            .unwrap();
        let before = store
            .read_property("alice", Property::WebappSettings)
            .unwrap();

        let res = session.update_settings("alice", |tree| {
            tree.insert("settings".into(), json!("oops"));
            Ok(())
        });
        assert!(matches!(res, Err(Error::MissingSettingsRootError(user)) if user == "alice"));

        let res = session.update_settings("alice", |tree| {
            tree.delete(&SettingsPath::parse("settings").unwrap());
            Ok(())
        });
        assert!(matches!(res, Err(Error::MissingSettingsRootError(_))));

        assert_eq!(
            before,
            store.read_property("alice", Property::WebappSettings).unwrap()
        );
    }

    #[test]
    fn batch_continues_after_failure() {
        let store = store();
        let config = AdminConfig::default();
        let session = Session::new(&store, &config);

        assert_eq!(
            vec!["alice", "bob"],
            session.users(&UserSelection::All).unwrap()
        );

        let users = session
            .users(&["bob", "carol", "alice"].into_iter().collect())
            .unwrap();
        let outcomes = session.for_each_user(&users, |user| {
            session.update_settings(user, |_| Ok(user.len()))
        });

        assert_eq!(3, outcomes.len());
        assert_eq!("bob", outcomes[0].0);
        assert_eq!(3, *outcomes[0].1.as_ref().unwrap());
        assert!(matches!(outcomes[1].1, Err(Error::StoreError(_))));
        assert_eq!(5, *outcomes[2].1.as_ref().unwrap());
    }
}
