// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use neph::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neph")]
#[command(about = "Run scripts and patch configuration files across a fleet of hosts")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI (results only)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output JSON lines for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to $NEPH_CONFIG, then /etc/neph/neph.yml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script from the scripts directory on a host
    Exec {
        /// Host to run on: localhost, a registry alias, an address or a hostname
        target: String,

        /// Script name inside the scripts directory
        script: String,

        /// Arguments passed to the script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Replace the managed region of a configuration file
    Apply {
        target: String,

        /// Configuration file; relative names live under the conf directory
        config_file: PathBuf,

        /// File on this host holding the new region content, or - for stdin
        block_file: PathBuf,
    },

    /// Print the managed region of a configuration file
    Examine {
        target: String,

        /// Configuration file; relative names live under the conf directory
        config_file: PathBuf,
    },

    /// List configuration files, scripts or registered hosts
    #[command(subcommand)]
    Info(InfoCommand),
}

#[derive(Subcommand)]
pub enum InfoCommand {
    /// List files under the conf directory
    Configs(InfoTarget),

    /// List files under the scripts directory
    Scripts(InfoTarget),

    /// List the host registry
    Hosts(InfoTarget),
}

#[derive(Args)]
pub struct InfoTarget {
    #[arg(default_value = "localhost")]
    pub target: String,
}

impl InfoCommand {
    pub fn name(&self) -> &'static str {
        match self {
            InfoCommand::Configs(_) => "configs",
            InfoCommand::Scripts(_) => "scripts",
            InfoCommand::Hosts(_) => "hosts",
        }
    }

    pub fn target(&self) -> &str {
        match self {
            InfoCommand::Configs(t) | InfoCommand::Scripts(t) | InfoCommand::Hosts(t) => &t.target,
        }
    }
}
