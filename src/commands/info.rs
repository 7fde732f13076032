// ABOUTME: Info command implementation.
// ABOUTME: Lists config files, scripts or the host registry, here or on a remote host.

use super::remote::remote_neph;
use super::target_resolver;
use crate::cli::InfoCommand;
use neph::config::Config;
use neph::dispatch::Target;
use neph::error::{Error, Result};
use neph::output::Output;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

pub async fn info(config: &Config, command: &InfoCommand, output: &Output) -> Result<i32> {
    match target_resolver(config).classify(command.target()).await? {
        Target::Local => {
            match command {
                InfoCommand::Configs(_) => list_files(&config.conf_dir, output)?,
                InfoCommand::Scripts(_) => list_files(&config.scripts_dir, output)?,
                InfoCommand::Hosts(_) => {
                    for (alias, address) in &config.hosts {
                        output.entry(&format!("{alias} {address}"));
                    }
                }
            }
            Ok(0)
        }
        Target::Remote(host) => {
            let args = vec!["info".to_string(), command.name().to_string()];
            remote_neph(config, host, args, &[], output).await
        }
    }
}

/// Print every non-hidden file below `dir`, recursing into subdirectories.
fn list_files(dir: &Path, output: &Output) -> Result<()> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|source| Error::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            output.entry(&entry.path().display().to_string());
        }
    }
    Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
