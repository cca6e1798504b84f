//! Logger module
//!
//! Provides logging utilities for the mock server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Mock registry events and match diagnostics
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, Outcome};

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Mock API server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Static root: {}", config.static_files.root));
    write_info(&format!("Log level: {}", config.logging.level));
    match config.server.workers {
        Some(workers) => write_info(&format!("Worker threads: {workers}")),
        None => write_info("Single-threaded runtime"),
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("  - GET    /mocks  (verify all mocks called)");
    write_info("  - POST   /mocks  (register mock)");
    write_info("  - DELETE /mocks  (reset mocks)");
    write_info("  - GET    /meta   (dump registered mocks)");
    write_info("======================================\n");
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("\n[Signal] {signal} received, shutting down"));
}

pub fn log_server_stopped() {
    write_info("[Shutdown] Listener closed, server stopped");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_mock_registered(method: &str, url: &str, total: usize) {
    write_info(&format!("[Mocks] Registered {method} {url} ({total} total)"));
}

pub fn log_mocks_reset() {
    write_info("[Mocks] Registry cleared");
}

/// Warn that a request reached a mocked path but its query did not match
pub fn log_mock_mismatch(message: &str) {
    log_warning(message);
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
