// ABOUTME: Validated domain types shared across neph.
// ABOUTME: Script names and remote host addresses.

mod remote_host;
mod script_name;

pub use remote_host::RemoteHost;
pub use script_name::{ScriptName, ScriptNameError};
