//! Mock API server
//!
//! An HTTP test double: serves static files from a directory and falls back
//! to mock endpoints registered, verified and reset over HTTP.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod mocks;
pub mod server;
