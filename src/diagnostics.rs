// ABOUTME: Non-fatal problems noticed while a command runs.
// ABOUTME: Reported after the command; they never change its exit code.

use crate::ssh;
use crate::types::RemoteHost;

/// Warnings collected over one command.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning; it is logged right away and kept for the report.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(host = %warning.host, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The connection could not be torn down cleanly.
    SshDisconnect,
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    /// Alias of the host the warning concerns.
    pub host: String,
    pub message: String,
}

impl Warning {
    pub fn ssh_disconnect(host: &RemoteHost, error: &ssh::Error) -> Self {
        Self {
            kind: WarningKind::SshDisconnect,
            host: host.name.clone(),
            message: format!("SSH disconnect failed for {host}: {error}"),
        }
    }
}
