// ABOUTME: Out-of-band host key lookup via ssh-keyscan, producing a pinned key.
// ABOUTME: Installs the scanner once through the package manager when it is missing.

use super::error::{Error, Result};
use crate::types::RemoteHost;
use russh::keys::ssh_key::{Algorithm, HashAlg, PublicKey};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How to find and run the key scanner.
#[derive(Debug, Clone)]
pub struct KeyscanConfig {
    /// Scanner executable, looked up on `PATH` unless it is a path.
    pub tool: String,
    /// Key type requested with `-t` (rsa, ecdsa, ed25519).
    pub key_type: String,
    /// Distribution package that provides `tool`.
    pub package: String,
    /// Package manager invocation; `package` is appended as the last argument.
    pub install_command: Vec<String>,
    /// Deadline for one scan.
    pub timeout: Duration,
}

impl Default for KeyscanConfig {
    fn default() -> Self {
        Self {
            tool: "ssh-keyscan".to_string(),
            key_type: "rsa".to_string(),
            package: "openssh-clients".to_string(),
            install_command: vec!["dnf".to_string(), "install".to_string(), "-y".to_string()],
            timeout: Duration::from_secs(30),
        }
    }
}

impl KeyscanConfig {
    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn install_command(mut self, command: Vec<String>) -> Self {
        self.install_command = command;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A host public key obtained without trusting the connection it will guard.
///
/// Only produced by parsing a key-scan record, so holding one means the key
/// was looked up out of band.
#[derive(Clone)]
pub struct PinnedHostKey {
    key: PublicKey,
}

impl PinnedHostKey {
    pub fn algorithm(&self) -> Algorithm {
        self.key.algorithm()
    }

    /// Exact comparison of key material; comments are ignored.
    pub fn matches(&self, presented: &PublicKey) -> bool {
        presented.key_data() == self.key.key_data()
    }

    pub fn fingerprint(&self) -> String {
        self.key.fingerprint(HashAlg::Sha256).to_string()
    }
}

impl fmt::Debug for PinnedHostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedHostKey")
            .field("algorithm", &self.algorithm().as_str())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// A remote host together with the key it must present.
#[derive(Debug, Clone)]
pub struct KeyedHost {
    pub host: RemoteHost,
    pub key: PinnedHostKey,
}

/// Parse `ssh-keyscan` output into a pinned key.
///
/// The first record that is not blank or a `#` comment is used. Anything
/// short of `<host> <key-type> <base64-key>` with a decodable key is
/// rejected.
pub fn parse_keyscan_output(host: &str, output: &str) -> Result<PinnedHostKey> {
    let unobtainable = |reason: String| Error::RemoteKeyUnobtainable {
        host: host.to_string(),
        reason,
    };

    let record = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| unobtainable("key scan returned no host key".to_string()))?;

    let mut fields = record.split_whitespace();
    let (Some(_), Some(key_type), Some(encoded)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(unobtainable(format!("malformed host key record '{record}'")));
    };

    let key = PublicKey::from_openssh(&format!("{key_type} {encoded}"))
        .map_err(|e| unobtainable(format!("unparsable {key_type} host key: {e}")))?;

    if key.algorithm().as_str() != key_type {
        return Err(unobtainable(format!(
            "record claims {key_type} but carries a {} key",
            key.algorithm().as_str()
        )));
    }

    Ok(PinnedHostKey { key })
}

/// Looks up a host's current public key with the key scanner.
#[derive(Debug, Clone)]
pub struct HostKeyResolver {
    config: KeyscanConfig,
}

impl HostKeyResolver {
    pub fn new(config: KeyscanConfig) -> Self {
        Self { config }
    }

    /// Obtain and pin the host key of `host`.
    pub async fn resolve(&self, host: RemoteHost) -> Result<KeyedHost> {
        let tool = self.locate_tool().await?;
        let output = self.scan(&tool, &host).await?;
        let key = parse_keyscan_output(&host.address, &output).map_err(|e| match e {
            Error::RemoteKeyUnobtainable { host, reason } => Error::RemoteKeyUnobtainable {
                host,
                reason: format!(
                    "{reason}; check that the remote sshd_config has a HostKey of type {}",
                    self.config.key_type
                ),
            },
            other => other,
        })?;

        tracing::debug!(
            host = %host,
            algorithm = key.algorithm().as_str(),
            fingerprint = %key.fingerprint(),
            "pinned host key"
        );
        Ok(KeyedHost { host, key })
    }

    async fn locate_tool(&self) -> Result<PathBuf> {
        if let Ok(path) = which::which(&self.config.tool) {
            return Ok(path);
        }

        tracing::warn!(
            "{} not found, attempting to install {}",
            self.config.tool,
            self.config.package
        );
        self.install().await?;

        which::which(&self.config.tool).map_err(|e| Error::LocalToolUnavailable {
            tool: self.config.tool.clone(),
            reason: format!("still not found after installing {}: {e}", self.config.package),
        })
    }

    async fn install(&self) -> Result<()> {
        let unavailable = |reason: String| Error::LocalToolUnavailable {
            tool: self.config.tool.clone(),
            reason,
        };

        let Some((program, args)) = self.config.install_command.split_first() else {
            return Err(unavailable("no install command configured".to_string()));
        };

        let output = Command::new(program)
            .args(args)
            .arg(&self.config.package)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| unavailable(format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            return Err(unavailable(format!(
                "installation of {} failed ({}): {}",
                self.config.package,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::info!("installed {}", self.config.package);
        Ok(())
    }

    async fn scan(&self, tool: &Path, host: &RemoteHost) -> Result<String> {
        let timeout_secs = self.config.timeout.as_secs().max(1);
        let child = Command::new(tool)
            .arg("-T")
            .arg(timeout_secs.to_string())
            .arg("-t")
            .arg(&self.config.key_type)
            .arg("-p")
            .arg(host.port.to_string())
            .arg(&host.address)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.config.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::LocalToolUnavailable {
                    tool: tool.display().to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => return Err(Error::KeyscanTimeout(self.config.timeout)),
        };

        if !output.status.success() {
            return Err(Error::RemoteKeyUnobtainable {
                host: host.address.clone(),
                reason: format!(
                    "{} exited with {}: {}",
                    tool.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
