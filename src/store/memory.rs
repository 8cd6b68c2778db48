//! Memory store module.
//!
//! This module contains an in-memory store. Nothing survives the
//! store instance, which makes it handy for dry runs and tests.

use log::trace;
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    result,
};
use thiserror::Error;

use crate::{store, Certificate, Certificates, Property, Store, UserProfile};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find user {0}")]
    FindUserError(String),
    #[error("cannot find certificate {1} of user {0}")]
    FindCertificateError(String, String),
}

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Default, Clone)]
struct Mailbox {
    profile: UserProfile,
    properties: HashMap<Property, Vec<u8>>,
    certificates: Vec<Certificate>,
}

/// Represents the in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    mailboxes: RefCell<BTreeMap<String, Mailbox>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user with an empty mailbox, or replaces the profile of
    /// an existing one.
    pub fn add_user<U: ToString>(&self, user: U, profile: UserProfile) {
        self.mailboxes
            .borrow_mut()
            .entry(user.to_string())
            .or_default()
            .profile = profile;
    }

    fn with_mailbox<T, F>(&self, user: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Mailbox) -> T,
    {
        let mut mailboxes = self.mailboxes.borrow_mut();
        let mailbox = mailboxes
            .get_mut(user)
            .ok_or_else(|| Error::FindUserError(user.to_owned()))?;
        Ok(f(mailbox))
    }
}

impl Store for MemoryStore {
    fn list_users(&self) -> store::Result<Vec<String>> {
        Ok(self.mailboxes.borrow().keys().cloned().collect())
    }

    fn user_profile(&self, user: &str) -> store::Result<UserProfile> {
        Ok(self.with_mailbox(user, |mailbox| mailbox.profile.clone())?)
    }

    fn read_property(&self, user: &str, property: Property) -> store::Result<Option<Vec<u8>>> {
        Ok(self.with_mailbox(user, |mailbox| mailbox.properties.get(&property).cloned())?)
    }

    fn write_property(&self, user: &str, property: Property, data: &[u8]) -> store::Result<()> {
        trace!("writing {} of {} in memory", property, user);
        Ok(self.with_mailbox(user, |mailbox| {
            mailbox.properties.insert(property, data.to_owned());
        })?)
    }

    fn delete_property(&self, user: &str, property: Property) -> store::Result<()> {
        Ok(self.with_mailbox(user, |mailbox| {
            mailbox.properties.remove(&property);
        })?)
    }

    fn list_certificates(&self, user: &str) -> store::Result<Certificates> {
        Ok(self.with_mailbox(user, |mailbox| {
            Certificates(mailbox.certificates.clone())
        })?)
    }

    fn add_certificate(&self, user: &str, certificate: &Certificate) -> store::Result<()> {
        Ok(self.with_mailbox(user, |mailbox| {
            mailbox.certificates.retain(|cert| cert.id != certificate.id);
            mailbox.certificates.push(certificate.clone());
        })?)
    }

    fn delete_certificate(&self, user: &str, id: &str) -> store::Result<()> {
        let deleted = self.with_mailbox(user, |mailbox| {
            let len = mailbox.certificates.len();
            mailbox.certificates.retain(|cert| cert.id != id);
            len != mailbox.certificates.len()
        })?;

        if deleted {
            Ok(())
        } else {
            Err(Error::FindCertificateError(user.to_owned(), id.to_owned()).into())
        }
    }
}
