// ABOUTME: SSH client module for remote hosts.
// ABOUTME: Host key pinning via key scan, key-file authentication, single-use command sessions.

mod client;
mod connector;
mod credential;
mod error;
mod keyscan;
mod runner;

pub use client::{CommandSession, Connection, SessionConfig};
pub use connector::SshConnector;
pub use credential::Credential;
pub use error::{Error, Result};
pub use keyscan::{HostKeyResolver, KeyedHost, KeyscanConfig, PinnedHostKey, parse_keyscan_output};
pub use runner::{CommandOutput, Connector, Probe, RemoteShell, probe};
