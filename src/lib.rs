// ABOUTME: Library root for neph - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod blocks;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod exit;
pub mod output;
pub mod ssh;
pub mod types;
