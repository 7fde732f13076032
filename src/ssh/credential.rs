// ABOUTME: Private key of the service identity neph logs in as.
// ABOUTME: Loaded from a configured path; key material never leaves this process.

use super::error::{Error, Result};
use russh::keys::{load_secret_key, ssh_key};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parsed private key plus the path it came from.
#[derive(Clone)]
pub struct Credential {
    path: PathBuf,
    key: Arc<ssh_key::PrivateKey>,
}

impl Credential {
    /// Read and parse an unencrypted OpenSSH or PEM private key.
    pub fn load(path: &Path) -> Result<Self> {
        let key = load_secret_key(path, None).map_err(|e| Error::CredentialUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            path = %path.display(),
            algorithm = key.algorithm().as_str(),
            "loaded private key"
        );
        Ok(Self {
            path: path.to_path_buf(),
            key: Arc::new(key),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn key(&self) -> Arc<ssh_key::PrivateKey> {
        Arc::clone(&self.key)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("path", &self.path)
            .field("key", &"<redacted>")
            .finish()
    }
}
