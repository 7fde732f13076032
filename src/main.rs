// ABOUTME: Entry point for the neph CLI application.
// ABOUTME: Parses arguments, dispatches to command handlers and exits with their code.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use neph::config::Config;
use neph::error::Result;
use neph::exit::ExitCode;
use neph::output::Output;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not errors.
            let code = if e.use_stderr() {
                ExitCode::BadArguments.code()
            } else {
                ExitCode::Success.code()
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());
    output.start_timer();

    let code = match run(cli, &output).await {
        Ok(code) => code,
        Err(e) => {
            output.error(&e.to_string());
            if let Some(hint) = e.hint() {
                output.hint(&hint);
            }
            e.exit_code().code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli, output: &Output) -> Result<i32> {
    let config = Config::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Exec {
            target,
            script,
            args,
        } => commands::exec(&config, &target, &script, &args, output).await,
        Commands::Apply {
            target,
            config_file,
            block_file,
        } => commands::apply(&config, &target, &config_file, &block_file, output).await,
        Commands::Examine {
            target,
            config_file,
        } => commands::examine(&config, &target, &config_file, output).await,
        Commands::Info(info) => commands::info(&config, &info, output).await,
    }
}
