// ABOUTME: Configuration types and parsing for neph.yml.
// ABOUTME: Handles YAML parsing, file discovery, defaults and validation.

use crate::blocks::DelimitedBlockStore;
use crate::error::{Error, Result};
use crate::ssh::{KeyscanConfig, SessionConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/neph/neph.yml";
pub const CONFIG_ENV_VAR: &str = "NEPH_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Token inside the managed-region markers.
    pub product: String,
    pub scripts_dir: PathBuf,
    pub conf_dir: PathBuf,
    /// Program run on remote hosts for pass-through commands.
    pub remote_binary: String,
    pub ssh: SshSettings,
    pub keyscan: KeyscanSettings,
    /// Host registry: alias to address.
    pub hosts: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product: "NEPH".to_string(),
            scripts_dir: PathBuf::from("/var/neph/scripts"),
            conf_dir: PathBuf::from("/etc/neph/conf"),
            remote_binary: "neph".to_string(),
            ssh: SshSettings::default(),
            keyscan: KeyscanSettings::default(),
            hosts: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshSettings {
    pub user: String,
    pub port: u16,
    pub key_path: PathBuf,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            port: 22,
            key_path: PathBuf::from("/root/.ssh/neph-rsa-private-key"),
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyscanSettings {
    pub tool: String,
    pub key_type: String,
    /// Package that provides `tool`.
    pub package: String,
    /// Package manager invocation; the package name is appended.
    pub install_command: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for KeyscanSettings {
    fn default() -> Self {
        let defaults = KeyscanConfig::default();
        Self {
            tool: defaults.tool,
            key_type: defaults.key_type,
            package: defaults.package,
            install_command: defaults.install_command,
            timeout: defaults.timeout,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults".
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_yaml(&content)
    }

    /// Find the configuration: an explicit path, then `NEPH_CONFIG`, then the
    /// default location. Only a missing default file falls back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Self::load(Path::new(&path));
        }

        let default = Path::new(DEFAULT_CONFIG_PATH);
        match Self::load(default) {
            Err(Error::ConfigNotFound(_)) => {
                tracing::debug!("no configuration at {DEFAULT_CONFIG_PATH}, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.product.is_empty() || self.product.chars().any(char::is_whitespace) {
            return Err(Error::InvalidConfig(format!(
                "product token '{}' must be non-empty and contain no whitespace",
                self.product
            )));
        }
        if self.remote_binary.trim().is_empty() {
            return Err(Error::InvalidConfig("remote_binary cannot be empty".into()));
        }
        if self.ssh.port == 0 {
            return Err(Error::InvalidConfig("ssh.port cannot be 0".into()));
        }
        if self.ssh.user.trim().is_empty() {
            return Err(Error::InvalidConfig("ssh.user cannot be empty".into()));
        }
        if self.keyscan.install_command.is_empty() {
            return Err(Error::InvalidConfig(
                "keyscan.install_command cannot be empty".into(),
            ));
        }
        if let Some((alias, _)) = self
            .hosts
            .iter()
            .find(|(_, address)| address.trim().is_empty())
        {
            return Err(Error::InvalidConfig(format!(
                "host '{alias}' has an empty address"
            )));
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(&self.ssh.user, &self.ssh.key_path)
            .connect_timeout(self.ssh.connect_timeout)
            .command_timeout(self.ssh.command_timeout)
    }

    pub fn keyscan_config(&self) -> KeyscanConfig {
        KeyscanConfig {
            tool: self.keyscan.tool.clone(),
            key_type: self.keyscan.key_type.clone(),
            package: self.keyscan.package.clone(),
            install_command: self.keyscan.install_command.clone(),
            timeout: self.keyscan.timeout,
        }
    }

    pub fn block_store(&self) -> DelimitedBlockStore {
        DelimitedBlockStore::new(&self.product)
    }

    /// Resolve a config-file argument; relative names live under `conf_dir`.
    pub fn conf_path(&self, name: &Path) -> PathBuf {
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.conf_dir.join(name)
        }
    }
}
