// ABOUTME: Process exit-code taxonomy shared by every neph command.
// ABOUTME: Values are a stable contract for scripts that call neph.

use std::fmt;

/// Exit codes neph itself produces.
///
/// A script's own exit status is passed through unchanged and never
/// converted into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    Success,
    /// Filesystem failure, or a script that failed without a usable code.
    Failure,
    /// Missing `ssh-keyscan` or unreadable private key on this host.
    LocalSshNotConfigured,
    /// Remote sshd refused or garbled the host key lookup.
    RemoteSshNotConfigured,
    ConnectionFailure,
    SessionFailure,
    /// neph itself is not installed on the remote host.
    NotInitialized,
    ConfigMissing,
    ConfigInvalid,
    ScriptMissing,
    ScriptNotExecutable,
    LogicError,
    BadArguments,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
            ExitCode::LocalSshNotConfigured => 2,
            ExitCode::RemoteSshNotConfigured => 3,
            ExitCode::ConnectionFailure => 4,
            ExitCode::SessionFailure => 5,
            ExitCode::NotInitialized => 6,
            ExitCode::ConfigMissing => 7,
            ExitCode::ConfigInvalid => 8,
            ExitCode::ScriptMissing => 9,
            ExitCode::ScriptNotExecutable => 10,
            ExitCode::LogicError => 11,
            ExitCode::BadArguments => 12,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
