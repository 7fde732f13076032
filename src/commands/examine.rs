// ABOUTME: Examine command implementation.
// ABOUTME: Prints the managed region of a configuration file.

use super::remote::remote_neph;
use super::target_resolver;
use neph::config::Config;
use neph::dispatch::Target;
use neph::error::Result;
use neph::output::Output;
use std::path::Path;

pub async fn examine(
    config: &Config,
    target: &str,
    config_file: &Path,
    output: &Output,
) -> Result<i32> {
    match target_resolver(config).classify(target).await? {
        Target::Local => {
            let path = config.conf_path(config_file);
            let block = config.block_store().read(&path)?;
            output.text(&block);
            Ok(0)
        }
        Target::Remote(host) => {
            let args = vec![
                "examine".to_string(),
                "localhost".to_string(),
                config_file.display().to_string(),
            ];
            remote_neph(config, host, args, &[], output).await
        }
    }
}
