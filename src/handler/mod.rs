//! Request handler module
//!
//! Responsible for request routing dispatch: mock administration, static
//! file serving and mock fulfilment.

pub mod mocks;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
