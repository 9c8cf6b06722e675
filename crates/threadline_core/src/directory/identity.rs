//! Identity directory contract and in-memory implementation.

use crate::directory::DirectoryError;
use std::collections::BTreeSet;

/// Login used for tombstoned comments unless configured otherwise.
pub const DEFAULT_PLACEHOLDER_LOGIN: &str = "_nobody_";

/// Resolves identity names for authorship and mention checks.
pub trait IdentityDirectory {
    /// Returns the subset of `logins` that name real identities.
    fn find_by_login(&self, logins: &BTreeSet<String>) -> Result<BTreeSet<String>, DirectoryError>;

    /// Returns the identity assigned to tombstoned comments.
    fn placeholder_identity(&self) -> &str;

    /// Returns whether `login` is the placeholder identity.
    fn is_placeholder(&self, login: &str) -> bool {
        login == self.placeholder_identity()
    }
}

impl<T: IdentityDirectory + ?Sized> IdentityDirectory for &T {
    fn find_by_login(&self, logins: &BTreeSet<String>) -> Result<BTreeSet<String>, DirectoryError> {
        (**self).find_by_login(logins)
    }

    fn placeholder_identity(&self) -> &str {
        (**self).placeholder_identity()
    }

    fn is_placeholder(&self, login: &str) -> bool {
        (**self).is_placeholder(login)
    }
}

/// Fixed identity set held in memory.
///
/// The placeholder login always resolves, matching a directory where the
/// system user exists as a regular record.
#[derive(Debug, Clone)]
pub struct StaticIdentityDirectory {
    placeholder: String,
    logins: BTreeSet<String>,
}

impl Default for StaticIdentityDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_LOGIN)
    }
}

impl StaticIdentityDirectory {
    pub fn new(placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        let mut logins = BTreeSet::new();
        logins.insert(placeholder.clone());
        Self {
            placeholder,
            logins,
        }
    }

    /// Builds a directory with the default placeholder and given logins.
    pub fn with_logins<I, S>(logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut directory = Self::default();
        for login in logins {
            directory.insert(login);
        }
        directory
    }

    /// Registers one login. Returns `false` when it was already known.
    pub fn insert(&mut self, login: impl Into<String>) -> bool {
        self.logins.insert(login.into())
    }
}

impl IdentityDirectory for StaticIdentityDirectory {
    fn find_by_login(&self, logins: &BTreeSet<String>) -> Result<BTreeSet<String>, DirectoryError> {
        Ok(logins.intersection(&self.logins).cloned().collect())
    }

    fn placeholder_identity(&self) -> &str {
        &self.placeholder
    }
}
