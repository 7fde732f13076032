// ABOUTME: SSH connection management using russh with a pinned host key.
// ABOUTME: Handles connection, public-key authentication, and single-use command sessions.

use super::credential::Credential;
use super::error::{Error, Result};
use super::keyscan::{KeyedHost, PinnedHostKey};
use super::runner::CommandOutput;
use crate::types::RemoteHost;
use russh::client::{self, Config, Handle};
use russh::keys::ssh_key::{self, Algorithm, HashAlg};
use russh::keys::PrivateKeyWithHashAlg;
use russh::{Channel, ChannelMsg, Disconnect, Preferred};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Identity and deadlines for establishing a connection.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Service identity to log in as.
    pub user: String,
    /// Private key for public-key authentication.
    pub key_path: PathBuf,
    /// Deadline for dial, handshake and authentication together.
    pub connect_timeout: Duration,
    /// Deadline for one remote command, including channel setup.
    pub command_timeout: Duration,
}

impl SessionConfig {
    pub fn new(user: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            key_path: key_path.into(),
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(300),
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// russh handler that accepts exactly one host key.
pub(crate) struct PinnedKeyHandler {
    host: String,
    key: PinnedHostKey,
}

impl client::Handler for PinnedKeyHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        if self.key.matches(server_public_key) {
            return Ok(true);
        }

        tracing::error!(
            host = %self.host,
            expected = %self.key.fingerprint(),
            presented = %server_public_key.fingerprint(HashAlg::Sha256),
            "host key does not match the scanned key"
        );
        Ok(false)
    }
}

/// Only offer the pinned key's algorithm so the server presents that key.
fn preferred_for(key: &PinnedHostKey) -> Preferred {
    let algorithms = match key.algorithm() {
        Algorithm::Rsa { .. } => vec![
            Algorithm::Rsa {
                hash: Some(HashAlg::Sha512),
            },
            Algorithm::Rsa {
                hash: Some(HashAlg::Sha256),
            },
            Algorithm::Rsa { hash: None },
        ],
        other => vec![other],
    };

    Preferred {
        key: Cow::Owned(algorithms),
        ..Preferred::default()
    }
}

/// An authenticated connection to one remote host.
///
/// Dropping it tears the transport down; [`Connection::close`] does so
/// politely and reports failures.
pub struct Connection {
    host: RemoteHost,
    handle: Handle<PinnedKeyHandler>,
    command_timeout: Duration,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Connection {
    /// Dial a keyed host and authenticate as the configured identity.
    pub async fn open(
        keyed: KeyedHost,
        credential: &Credential,
        config: &SessionConfig,
    ) -> Result<Self> {
        let KeyedHost { host, key } = keyed;

        let establish = Self::establish(&host, key, credential, config);
        let handle = match tokio::time::timeout(config.connect_timeout, establish).await {
            Ok(result) => result?,
            Err(_) => return Err(Error::ConnectTimeout(config.connect_timeout)),
        };

        tracing::debug!(host = %host, user = %config.user, "connected");
        Ok(Self {
            host,
            handle,
            command_timeout: config.command_timeout,
        })
    }

    async fn establish(
        host: &RemoteHost,
        key: PinnedHostKey,
        credential: &Credential,
        config: &SessionConfig,
    ) -> Result<Handle<PinnedKeyHandler>> {
        let russh_config = Config {
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(15)),
            keepalive_max: 3,
            preferred: preferred_for(&key),
            ..Default::default()
        };

        let handler = PinnedKeyHandler {
            host: host.to_string(),
            key,
        };

        let mut handle = client::connect(
            Arc::new(russh_config),
            (host.address.as_str(), host.port),
            handler,
        )
        .await
        .map_err(|e| match e {
            russh::Error::UnknownKey => Error::HostKeyMismatch {
                host: host.to_string(),
            },
            e if e.to_string().contains("Connection refused") => Error::Connection(format!(
                "connection refused to {}:{}",
                host.address, host.port
            )),
            e => Error::Connection(format!("failed to dial {}:{}: {e}", host.address, host.port)),
        })?;

        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .map_err(Error::Protocol)?
            .flatten();

        let result = handle
            .authenticate_publickey(
                &config.user,
                PrivateKeyWithHashAlg::new(credential.key(), hash_alg),
            )
            .await
            .map_err(Error::Protocol)?;

        if !result.success() {
            return Err(Error::AuthenticationFailed {
                user: config.user.clone(),
            });
        }

        Ok(handle)
    }

    pub fn host(&self) -> &RemoteHost {
        &self.host
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Open a fresh channel for a single command.
    pub async fn open_session(&self) -> Result<CommandSession> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::SessionFailed(format!("failed to open channel: {e}")))?;
        Ok(CommandSession { channel })
    }

    /// Disconnect from the host.
    pub async fn close(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        tracing::debug!(host = %self.host, "disconnected");
        Ok(())
    }
}

/// One channel, good for exactly one command.
pub struct CommandSession {
    channel: Channel<client::Msg>,
}

impl CommandSession {
    /// Run `command` verbatim, feed it `stdin` and drain its output.
    ///
    /// A channel that closes without reporting an exit status or signal is a
    /// session fault, not a command failure.
    pub async fn run(mut self, command: &str, stdin: &[u8]) -> Result<CommandOutput> {
        self.channel
            .exec(true, command)
            .await
            .map_err(|e| Error::SessionFailed(format!("failed to exec command: {e}")))?;

        if !stdin.is_empty() {
            self.channel
                .data(stdin)
                .await
                .map_err(|e| Error::SessionFailed(format!("failed to send input: {e}")))?;
        }
        // The command may already have exited and closed its side.
        if let Err(e) = self.channel.eof().await {
            tracing::debug!("sending end of input: {e}");
        }

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = None;
        let mut signal = None;
        let mut got_eof = false;

        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    if ext == 1 {
                        stderr.extend_from_slice(&data);
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    exit_code = Some(exit_status);
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                    signal = Some(format!("{signal_name:?}"));
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelMsg::Eof) => {
                    got_eof = true;
                    if exit_code.is_some() || signal.is_some() {
                        break;
                    }
                }
                Some(ChannelMsg::Close) => break,
                Some(_) => {}
                None => break,
            }
        }

        let exit_code = match (exit_code, &signal) {
            (Some(code), _) => code,
            (None, Some(name)) => {
                tracing::warn!(command, signal = %name, "remote command killed by signal");
                1
            }
            (None, None) => return Err(Error::ChannelClosed),
        };

        if let Err(e) = self.channel.close().await {
            tracing::debug!("channel close after command: {e}");
        }

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            signal,
        })
    }
}
