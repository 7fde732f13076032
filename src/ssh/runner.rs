// ABOUTME: Single-command remote execution and the test -f / test -x probes.
// ABOUTME: Separates a clean remote exit (any code) from a failed session.

use super::client::Connection;
use super::error::{Error, Result};
use crate::types::RemoteHost;
use async_trait::async_trait;

/// Outcome of a remote process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status reported by the remote process, unchanged.
    pub exit_code: u32,
    pub stdout: String,
    pub stderr: String,
    /// Signal name when the process was killed instead of exiting.
    pub signal: Option<String>,
}

impl CommandOutput {
    pub fn exited(exit_code: u32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: String::new(),
            signal: None,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.signal.is_none()
    }
}

/// Runs one command per call, each over its own session.
///
/// `Ok` means the remote process ran and exited, whatever its code. `Err`
/// means no exit status could be obtained.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run `command` with `stdin` delivered to it, then end of input.
    async fn run_with_stdin(&self, command: &str, stdin: &[u8]) -> Result<CommandOutput>;

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.run_with_stdin(command, &[]).await
    }
}

#[async_trait]
impl RemoteShell for Connection {
    async fn run_with_stdin(&self, command: &str, stdin: &[u8]) -> Result<CommandOutput> {
        tracing::debug!(
            host = %self.host(),
            command,
            stdin_bytes = stdin.len(),
            "running remote command"
        );

        let timeout = self.command_timeout();
        let attempt = async { self.open_session().await?.run(command, stdin).await };
        match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(Error::CommandTimeout(timeout)),
        }
    }
}

/// Opens and releases connections to remote hosts.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: RemoteShell;

    async fn connect(&self, host: RemoteHost) -> Result<Self::Connection>;

    /// Tear a connection down. Takes ownership so it happens once.
    async fn release(&self, connection: Self::Connection) -> Result<()>;
}

/// File predicates checked with `test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Exists,
    Executable,
}

impl Probe {
    pub fn command(self, path: &str) -> String {
        let flag = match self {
            Probe::Exists => "-f",
            Probe::Executable => "-x",
        };
        format!("test {flag} {path}")
    }
}

/// Evaluate a probe remotely. A non-zero exit is `false`, not an error.
pub async fn probe<S>(shell: &S, probe: Probe, path: &str) -> Result<bool>
where
    S: RemoteShell + ?Sized,
{
    let output = shell.run(&probe.command(path)).await?;
    Ok(output.success())
}
