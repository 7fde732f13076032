// ABOUTME: Shared helpers for integration tests.
// ABOUTME: Hosts the in-process SSH server used by the transport tests.

pub mod ssh_server;
