// ABOUTME: Production connector: key scan, credential, then pinned SSH connection.
// ABOUTME: The credential is read at most once per connector.

use super::client::{Connection, SessionConfig};
use super::credential::Credential;
use super::error::Result;
use super::keyscan::HostKeyResolver;
use super::runner::Connector;
use crate::types::RemoteHost;
use async_trait::async_trait;
use tokio::sync::OnceCell;

/// Connects to hosts whose keys are scanned immediately beforehand.
#[derive(Debug)]
pub struct SshConnector {
    resolver: HostKeyResolver,
    session: SessionConfig,
    credential: OnceCell<Credential>,
}

impl SshConnector {
    pub fn new(resolver: HostKeyResolver, session: SessionConfig) -> Self {
        Self {
            resolver,
            session,
            credential: OnceCell::new(),
        }
    }

    async fn credential(&self) -> Result<&Credential> {
        self.credential
            .get_or_try_init(|| async { Credential::load(&self.session.key_path) })
            .await
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Connection = Connection;

    async fn connect(&self, host: RemoteHost) -> Result<Connection> {
        let keyed = self.resolver.resolve(host).await?;
        let credential = self.credential().await?;
        Connection::open(keyed, credential, &self.session).await
    }

    async fn release(&self, connection: Connection) -> Result<()> {
        connection.close().await
    }
}
