// ABOUTME: Apply command implementation.
// ABOUTME: Replaces the managed region of a configuration file with a block file's content.

use super::remote::remote_neph;
use super::target_resolver;
use neph::config::Config;
use neph::dispatch::Target;
use neph::error::{Error, Result};
use neph::output::Output;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Block-file argument that reads the block from standard input.
const STDIN_BLOCK: &str = "-";

pub async fn apply(
    config: &Config,
    target: &str,
    config_file: &Path,
    block_file: &Path,
    output: &Output,
) -> Result<i32> {
    let destination = target_resolver(config).classify(target).await?;
    // The block always comes from this host, whatever the target.
    let block = read_block(block_file).await?;

    match destination {
        Target::Local => {
            let path = config.conf_path(config_file);
            config.block_store().replace(&path, &block)?;

            output.success(&format!("Replaced managed region of {}", path.display()));
            Ok(0)
        }
        Target::Remote(host) => {
            let args = vec![
                "apply".to_string(),
                "localhost".to_string(),
                config_file.display().to_string(),
                STDIN_BLOCK.to_string(),
            ];
            remote_neph(config, host, args, block.as_bytes(), output).await
        }
    }
}

async fn read_block(block_file: &Path) -> Result<String> {
    let read_error = |source: std::io::Error| Error::ReadBlockFile {
        path: block_file.to_path_buf(),
        source,
    };

    if block_file == Path::new(STDIN_BLOCK) {
        let mut block = String::new();
        tokio::io::stdin()
            .read_to_string(&mut block)
            .await
            .map_err(read_error)?;
        return Ok(block);
    }

    tokio::fs::read_to_string(block_file)
        .await
        .map_err(read_error)
}
