// ABOUTME: Command module aggregator for the neph CLI.
// ABOUTME: Builds the shared SSH pieces from configuration for each handler.

mod apply;
mod examine;
mod exec;
mod info;
mod remote;

pub use apply::apply;
pub use examine::examine;
pub use exec::exec;
pub use info::info;

use neph::config::Config;
use neph::diagnostics::Diagnostics;
use neph::dispatch::TargetResolver;
use neph::output::Output;
use neph::ssh::{HostKeyResolver, SshConnector};

fn target_resolver(config: &Config) -> TargetResolver {
    TargetResolver::new(config.hosts.clone(), config.ssh.port)
}

fn ssh_connector(config: &Config) -> SshConnector {
    SshConnector::new(
        HostKeyResolver::new(config.keyscan_config()),
        config.session_config(),
    )
}

fn emit_warnings(diag: &Diagnostics, output: &Output) {
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
}
