// ABOUTME: In-process russh server bound to 127.0.0.1 for exercising the real client.
// ABOUTME: Answers a tiny command vocabulary and records every exec request it sees.

use parking_lot::Mutex;
use russh::keys::load_secret_key;
use russh::keys::ssh_key::PublicKey;
use russh::server::{self, Auth, Msg, Session};
use russh::{Channel, ChannelId, CryptoVec, Sig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// A listening server. Commands it understands:
///
/// - `exit N`: exits with status N
/// - `echo WORDS`: prints WORDS and exits 0
/// - `cat`: echoes its stdin back once input ends, then exits 0
/// - `kill`: reports death by SIGKILL without an exit status
/// - `drop`: closes the channel without any status
pub struct TestServer {
    pub port: u16,
    commands: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Start accepting connections, presenting the private key at `host_key`.
    pub async fn start(host_key: &Path) -> Self {
        let key = load_secret_key(host_key, None).unwrap();
        let config = Arc::new(server::Config {
            keys: vec![key],
            inactivity_timeout: None,
            auth_rejection_time: Duration::from_millis(10),
            ..Default::default()
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let commands: Arc<Mutex<Vec<String>>> = Arc::default();

        let recorded = Arc::clone(&commands);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let responder = Responder {
                    commands: Arc::clone(&recorded),
                    stdin: HashMap::new(),
                };
                let config = Arc::clone(&config);
                tokio::spawn(async move {
                    if let Ok(session) = server::run_stream(config, socket, responder).await {
                        let _ = session.await;
                    }
                });
            }
        });

        Self { port, commands }
    }

    /// Every command an authenticated client asked to run, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

struct Responder {
    commands: Arc<Mutex<Vec<String>>>,
    /// Input collected for `cat` channels until the client sends EOF.
    stdin: HashMap<ChannelId, Vec<u8>>,
}

fn finish(channel: ChannelId, session: &mut Session) -> Result<(), russh::Error> {
    session.eof(channel)?;
    session.close(channel)
}

impl server::Handler for Responder {
    type Error = russh::Error;

    async fn auth_publickey(&mut self, _user: &str, _key: &PublicKey) -> Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        _channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        let command = String::from_utf8_lossy(data).into_owned();
        self.commands.lock().push(command.clone());
        session.channel_success(channel)?;

        if command == "cat" {
            self.stdin.insert(channel, Vec::new());
            return Ok(());
        }
        if command == "drop" {
            return finish(channel, session);
        }
        if command == "kill" {
            session.exit_signal_request(channel, Sig::KILL, false, "killed", "en")?;
            return finish(channel, session);
        }
        if let Some(words) = command.strip_prefix("echo ") {
            session.data(channel, CryptoVec::from(format!("{words}\n")))?;
            session.exit_status_request(channel, 0)?;
            return finish(channel, session);
        }

        let status = command
            .strip_prefix("exit ")
            .and_then(|code| code.parse().ok())
            .unwrap_or(127);
        session.exit_status_request(channel, status)?;
        finish(channel, session)
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if let Some(input) = self.stdin.get_mut(&channel) {
            input.extend_from_slice(data);
        }
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if let Some(input) = self.stdin.remove(&channel) {
            session.data(channel, CryptoVec::from(input))?;
            session.exit_status_request(channel, 0)?;
            finish(channel, session)?;
        }
        Ok(())
    }
}
