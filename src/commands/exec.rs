// ABOUTME: Exec command implementation.
// ABOUTME: Runs a named script on this host or a remote one and returns its exit code.

use super::{emit_warnings, ssh_connector, target_resolver};
use neph::config::Config;
use neph::diagnostics::Diagnostics;
use neph::dispatch::ScriptDispatcher;
use neph::error::Result;
use neph::output::Output;

pub async fn exec(
    config: &Config,
    target: &str,
    script: &str,
    args: &[String],
    output: &Output,
) -> Result<i32> {
    let dispatcher = ScriptDispatcher::new(
        ssh_connector(config),
        target_resolver(config),
        &config.scripts_dir,
    )
    .command_timeout(config.ssh.command_timeout);

    let mut diag = Diagnostics::default();
    let result = dispatcher.dispatch(target, script, args, &mut diag).await;
    emit_warnings(&diag, output);

    let report = result?;
    let label = match &report.host {
        None => format!("script {}", report.script),
        Some(host) => format!("remote script {} on {host}", report.script),
    };
    output.framed(&label, &report.output);

    Ok(report.exit_code() as i32)
}
