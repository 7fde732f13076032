// ABOUTME: Decides where a script runs and runs it there.
// ABOUTME: Remote runs check existence, then permission, then execute, over one connection.

mod local;
mod target;

pub use local::run_local;
pub use target::{Target, TargetResolver};

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::ssh::{CommandOutput, Connector, Probe, RemoteShell, probe};
use crate::types::{RemoteHost, ScriptName};
use std::path::PathBuf;
use std::time::Duration;

/// Result of a dispatched script that ran to completion.
#[derive(Debug, Clone)]
pub struct ScriptReport {
    pub script: ScriptName,
    /// `None` when the script ran on this host.
    pub host: Option<RemoteHost>,
    pub output: CommandOutput,
}

impl ScriptReport {
    /// The script's own exit code.
    pub fn exit_code(&self) -> u32 {
        self.output.exit_code
    }
}

/// Runs named scripts from the scripts directory, locally or over SSH.
pub struct ScriptDispatcher<C> {
    connector: C,
    resolver: TargetResolver,
    scripts_dir: PathBuf,
    command_timeout: Duration,
}

impl<C: Connector> ScriptDispatcher<C> {
    pub fn new(connector: C, resolver: TargetResolver, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            connector,
            resolver,
            scripts_dir: scripts_dir.into(),
            command_timeout: Duration::from_secs(300),
        }
    }

    /// Deadline for local scripts.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub async fn dispatch(
        &self,
        target: &str,
        script: &str,
        args: &[String],
        diag: &mut Diagnostics,
    ) -> Result<ScriptReport> {
        let script = ScriptName::new(script)?;

        match self.resolver.classify(target).await? {
            Target::Local => {
                let path = script.path_in(&self.scripts_dir);
                let output = run_local(&path, args, self.command_timeout).await?;
                Ok(ScriptReport {
                    script,
                    host: None,
                    output,
                })
            }
            Target::Remote(host) => {
                let connection = self.connector.connect(host.clone()).await?;
                let result = self.run_remote(&connection, &script, args).await;
                release(&self.connector, connection, &host, diag).await;
                Ok(ScriptReport {
                    script,
                    host: Some(host),
                    output: result?,
                })
            }
        }
    }

    async fn run_remote(
        &self,
        shell: &C::Connection,
        script: &ScriptName,
        args: &[String],
    ) -> Result<CommandOutput> {
        let path = script.path_in(&self.scripts_dir);
        let remote_path = path.to_string_lossy();

        if !probe(shell, Probe::Exists, &remote_path).await? {
            return Err(Error::ScriptMissing(path));
        }
        if !probe(shell, Probe::Executable, &remote_path).await? {
            return Err(Error::ScriptNotExecutable(path));
        }

        let output = shell.run(&command_line(&remote_path, args)).await?;
        if output.exit_code != 0 {
            tracing::warn!("remote script {} exited with code {}", script, output.exit_code);
        }
        Ok(output)
    }
}

/// Run `program args...` on a remote host as the pass-through of a neph
/// command. Exit status 127 means the program is not installed there.
pub async fn pass_through<C: Connector>(
    connector: &C,
    host: RemoteHost,
    program: &str,
    args: &[String],
    diag: &mut Diagnostics,
) -> Result<CommandOutput> {
    pass_through_with_stdin(connector, host, program, args, &[], diag).await
}

/// [`pass_through`] with `stdin` fed to the remote program.
pub async fn pass_through_with_stdin<C: Connector>(
    connector: &C,
    host: RemoteHost,
    program: &str,
    args: &[String],
    stdin: &[u8],
    diag: &mut Diagnostics,
) -> Result<CommandOutput> {
    let command = command_line(program, args);
    let connection = connector.connect(host.clone()).await?;
    let result = connection.run_with_stdin(&command, stdin).await;
    release(connector, connection, &host, diag).await;

    let output = result?;
    if output.exit_code == 127 {
        return Err(Error::NotInitialized {
            host: host.name,
            command,
        });
    }
    Ok(output)
}

/// Tear a connection down; failure is only a warning.
pub async fn release<C: Connector>(
    connector: &C,
    connection: C::Connection,
    host: &RemoteHost,
    diag: &mut Diagnostics,
) {
    if let Err(e) = connector.release(connection).await {
        diag.warn(Warning::ssh_disconnect(host, &e));
    }
}

/// `program` followed by each argument single-quoted for a POSIX shell.
pub fn command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&shell_quote(arg));
    }
    line
}

fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}
