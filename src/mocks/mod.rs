//! Mock registry module
//!
//! Holds the programmable endpoints registered over `/mocks`:
//! - Mock definitions and their JSON payload shape
//! - Method and query-parameter matching
//! - The in-memory registry shared by all connections

mod definition;
pub mod matcher;
mod registry;

pub use definition::{MockDefinition, MockResponse, DEFAULT_STATUS};
pub use registry::MockRegistry;

use thiserror::Error;

/// Errors raised while accepting a mock registration
#[derive(Debug, Error)]
pub enum MockError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Mock definition must have a non-empty url")]
    MissingUrl,

    #[error("Invalid status code {0}: expected a value between 200 and 999")]
    InvalidStatus(u16),
}
