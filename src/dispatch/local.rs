// ABOUTME: Runs a script on this host as a child process.
// ABOUTME: Missing scripts are reported before anything is spawned.

use crate::error::{Error, Result};
use crate::ssh::CommandOutput;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Run the script at `path` with `args`, capturing its output.
///
/// The script's own exit code is returned in the output; a script killed by
/// a signal reports 1.
pub async fn run_local(path: &Path, args: &[String], timeout: Duration) -> Result<CommandOutput> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(Error::ScriptMissing(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ScriptMissing(path.to_path_buf()));
        }
        Err(e) => return Err(Error::Io(e)),
    }

    tracing::info!("running local script {}", path.display());

    let child = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => Error::ScriptNotExecutable(path.to_path_buf()),
            _ => Error::ScriptSpawn {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => return Err(Error::ScriptTimeout(timeout)),
    };

    let signal = output.status.signal().map(|n| format!("signal {n}"));
    let exit_code = match output.status.code() {
        Some(code) => code as u32,
        None => {
            tracing::warn!(
                "{} killed by {}",
                path.display(),
                signal.as_deref().unwrap_or("a signal")
            );
            1
        }
    };

    if exit_code != 0 {
        tracing::warn!("{} exited with code {exit_code}", path.display());
    }

    Ok(CommandOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        signal,
    })
}
