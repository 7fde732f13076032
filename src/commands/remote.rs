// ABOUTME: Runs a neph subcommand on a remote host and relays its result.
// ABOUTME: Used by apply, examine and info when the target is not this host.

use super::{emit_warnings, ssh_connector};
use neph::config::Config;
use neph::diagnostics::Diagnostics;
use neph::dispatch::pass_through_with_stdin;
use neph::error::Result;
use neph::output::Output;
use neph::types::RemoteHost;

/// Run `<remote_binary> args...` on `host` with `stdin` as its input; its
/// exit code is returned as is.
pub async fn remote_neph(
    config: &Config,
    host: RemoteHost,
    args: Vec<String>,
    stdin: &[u8],
    output: &Output,
) -> Result<i32> {
    let connector = ssh_connector(config);
    let label = format!("remote neph command on {host}");
    let mut diag = Diagnostics::default();

    output.progress(&format!("Connecting to {host}..."));
    let result = pass_through_with_stdin(
        &connector,
        host,
        &config.remote_binary,
        &args,
        stdin,
        &mut diag,
    )
    .await;
    emit_warnings(&diag, output);

    let remote = result?;
    output.framed(&label, &remote);
    Ok(remote.exit_code as i32)
}
