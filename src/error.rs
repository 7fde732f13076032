// ABOUTME: Application-wide error types for neph.
// ABOUTME: Uses thiserror; every variant maps onto the exit-code taxonomy.

use crate::blocks::BlockError;
use crate::exit::ExitCode;
use crate::ssh;
use crate::types::ScriptNameError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Ssh(#[from] ssh::Error),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error("invalid script name: {0}")]
    InvalidScriptName(#[from] ScriptNameError),

    #[error("script {0} does not exist")]
    ScriptMissing(PathBuf),

    #[error("script {0} is not executable, try 'chmod +x {0}'")]
    ScriptNotExecutable(PathBuf),

    #[error("failed to run script {path}: {source}")]
    ScriptSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("local script timed out after {0:?}")]
    ScriptTimeout(Duration),

    #[error("'{0}' is neither this host nor a resolvable remote host")]
    UnclassifiedTarget(String),

    #[error("'{command}' can't be executed until neph is installed on {host}")]
    NotInitialized { host: String, command: String },

    #[error("unable to list {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("unable to read {path}: {source}")]
    ReadBlockFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::ConfigNotFound(_) => ExitCode::ConfigMissing,
            Error::InvalidConfig(_) | Error::Yaml(_) => ExitCode::ConfigInvalid,
            Error::Ssh(e) => e.exit_code(),
            Error::Block(e) => e.exit_code(),
            Error::InvalidScriptName(_) => ExitCode::BadArguments,
            Error::ScriptMissing(_) => ExitCode::ScriptMissing,
            Error::ScriptNotExecutable(_) => ExitCode::ScriptNotExecutable,
            Error::ScriptTimeout(_) => ExitCode::SessionFailure,
            Error::UnclassifiedTarget(_) => ExitCode::LogicError,
            Error::NotInitialized { .. } => ExitCode::NotInitialized,
            Error::ScriptSpawn { .. }
            | Error::ListDir { .. }
            | Error::ReadBlockFile { .. }
            | Error::Io(_) => ExitCode::Failure,
        }
    }

    /// Follow-up advice printed after the error, if any.
    pub fn hint(&self) -> Option<String> {
        match self {
            Error::Ssh(ssh::Error::AuthenticationFailed { .. }) => Some(
                "make sure the public half of the configured key is in the remote \
                 authorized_keys"
                    .to_string(),
            ),
            Error::NotInitialized { host, .. } => {
                Some(format!("set up the remote host first with 'neph init {host}'"))
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
