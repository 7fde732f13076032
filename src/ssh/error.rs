// ABOUTME: SSH-specific error types.
// ABOUTME: Covers host key lookup, credentials, connection, and session failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::exit::ExitCode;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{tool} utility not found and not installed: {reason}")]
    LocalToolUnavailable { tool: String, reason: String },

    #[error("unable to obtain public host key from {host}: {reason}")]
    RemoteKeyUnobtainable { host: String, reason: String },

    #[error("host key lookup timed out after {0:?}")]
    KeyscanTimeout(Duration),

    #[error("unable to load private key {path}: {reason}")]
    CredentialUnavailable { path: PathBuf, reason: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("host key presented by {host} does not match the pinned key")]
    HostKeyMismatch { host: String },

    #[error("authentication failed: {user} was not accepted with the configured key")]
    AuthenticationFailed { user: String },

    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("session failed: {0}")]
    SessionFailed(String),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),
}

impl Error {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::LocalToolUnavailable { .. } | Error::CredentialUnavailable { .. } => {
                ExitCode::LocalSshNotConfigured
            }
            Error::RemoteKeyUnobtainable { .. } | Error::KeyscanTimeout(_) => {
                ExitCode::RemoteSshNotConfigured
            }
            Error::Connection(_)
            | Error::HostKeyMismatch { .. }
            | Error::AuthenticationFailed { .. }
            | Error::ConnectTimeout(_)
            | Error::Protocol(_) => ExitCode::ConnectionFailure,
            Error::SessionFailed(_) | Error::ChannelClosed | Error::CommandTimeout(_) => {
                ExitCode::SessionFailure
            }
        }
    }

    /// Whether this is a deadline expiry rather than a hard failure.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::KeyscanTimeout(_) | Error::ConnectTimeout(_) | Error::CommandTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
