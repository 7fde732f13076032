// ABOUTME: A managed host reached over SSH, before its key is pinned.
// ABOUTME: Built fresh for every command invocation and never persisted.

use std::fmt;

/// Address and port of a remote host.
///
/// `name` is what the user typed (a registry alias or the address itself);
/// `address` is what gets dialed and key-scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    pub name: String,
    pub address: String,
    pub port: u16,
}

impl RemoteHost {
    pub fn new(name: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.address {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.address)
        }
    }
}
