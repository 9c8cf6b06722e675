//! Host object lookup, one shape per host type.

use crate::directory::DirectoryError;
use crate::model::comment::{HostId, HostRef, HostType};
use std::collections::BTreeMap;

/// Concrete host object data needed to build notification payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    Project {
        name: String,
    },
    Package {
        name: String,
        project: String,
    },
    Request {
        number: i64,
        /// Request-specific payload fields (state, author, actions, ...).
        notify_fields: BTreeMap<String, String>,
    },
}

impl Host {
    pub fn host_type(&self) -> HostType {
        match self {
            Self::Project { .. } => HostType::Project,
            Self::Package { .. } => HostType::Package,
            Self::Request { .. } => HostType::Request,
        }
    }
}

/// Resolves a host reference to its concrete host object.
pub trait HostDirectory {
    /// Returns `None` when no host of that type and id exists.
    fn find_host(&self, host: HostRef) -> Result<Option<Host>, DirectoryError>;
}

impl<T: HostDirectory + ?Sized> HostDirectory for &T {
    fn find_host(&self, host: HostRef) -> Result<Option<Host>, DirectoryError> {
        (**self).find_host(host)
    }
}

/// Fixed host set held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticHostDirectory {
    hosts: BTreeMap<HostRef, Host>,
}

impl StaticHostDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `host` under `host_id` and returns its reference.
    ///
    /// The reference's type is derived from the host itself, so a lookup can
    /// never return a host of another type.
    pub fn insert(&mut self, host_id: HostId, host: Host) -> HostRef {
        let host_ref = HostRef::new(host.host_type(), host_id);
        self.hosts.insert(host_ref, host);
        host_ref
    }
}

impl HostDirectory for StaticHostDirectory {
    fn find_host(&self, host: HostRef) -> Result<Option<Host>, DirectoryError> {
        Ok(self.hosts.get(&host).cloned())
    }
}
