// ABOUTME: Classifies a target argument as this host or a remote host.
// ABOUTME: Consults the host registry first, then IP literals, then DNS.

use crate::error::{Error, Result};
use crate::types::RemoteHost;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Where a command should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Local,
    Remote(RemoteHost),
}

#[derive(Debug, Clone)]
pub struct TargetResolver {
    hosts: BTreeMap<String, String>,
    port: u16,
    hostname: Option<String>,
}

impl TargetResolver {
    pub fn new(hosts: BTreeMap<String, String>, port: u16) -> Self {
        let hostname = gethostname::gethostname().into_string().ok();
        Self {
            hosts,
            port,
            hostname,
        }
    }

    /// Override the name this machine answers to.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub async fn classify(&self, target: &str) -> Result<Target> {
        if self.is_local(target) {
            return Ok(Target::Local);
        }

        if let Some(address) = self.hosts.get(target) {
            if self.is_local(address) {
                return Ok(Target::Local);
            }
            return Ok(Target::Remote(RemoteHost::new(target, address, self.port)));
        }

        if target.parse::<IpAddr>().is_ok() {
            // Loopback literals were caught by is_local.
            return Ok(Target::Remote(RemoteHost::new(target, target, self.port)));
        }

        let addrs: Vec<_> = match tokio::net::lookup_host((target, self.port)).await {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                tracing::debug!(target, "lookup failed: {e}");
                return Err(Error::UnclassifiedTarget(target.to_string()));
            }
        };

        if addrs.is_empty() {
            return Err(Error::UnclassifiedTarget(target.to_string()));
        }
        if addrs.iter().all(|addr| addr.ip().is_loopback()) {
            return Ok(Target::Local);
        }
        Ok(Target::Remote(RemoteHost::new(target, target, self.port)))
    }

    fn is_local(&self, name: &str) -> bool {
        if name.eq_ignore_ascii_case("localhost") {
            return true;
        }
        if let Ok(ip) = name.parse::<IpAddr>() {
            return ip.is_loopback();
        }
        self.hostname
            .as_deref()
            .is_some_and(|hostname| hostname.eq_ignore_ascii_case(name))
    }
}
