// Mock definition types
// JSON shape accepted by POST /mocks and emitted by GET /meta

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::MockError;

/// Status used when a definition does not set one
pub const DEFAULT_STATUS: u16 = 200;

/// Statuses a mock may answer with. 1xx is excluded: hyper treats an
/// informational final response as an upgrade and drops the body.
const STATUS_RANGE: RangeInclusive<u16> = 200..=999;

/// One registered expectation and its canned response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MockDefinition {
    /// Request path, also the registry key
    pub url: String,
    /// HTTP method, compared case-sensitively
    pub method: String,
    /// Expected query parameters (exact set and values)
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: BTreeMap<String, String>,
    /// Response status, `DEFAULT_STATUS` when absent or zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub response: MockResponse,
    /// Set once a request has been fulfilled against this definition
    #[serde(default, skip_deserializing)]
    pub called: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MockResponse {
    /// Returned verbatim as the response payload
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MockDefinition {
    /// Parse a registration payload and validate it
    pub fn from_json(bytes: &[u8]) -> Result<Self, MockError> {
        let definition: Self = serde_json::from_slice(bytes)?;
        definition.validate()?;
        Ok(definition)
    }

    fn validate(&self) -> Result<(), MockError> {
        if self.url.is_empty() {
            return Err(MockError::MissingUrl);
        }
        if let Some(status) = self.status {
            if status != 0 && !STATUS_RANGE.contains(&status) {
                return Err(MockError::InvalidStatus(status));
            }
        }
        Ok(())
    }

    pub fn effective_status(&self) -> u16 {
        self.status.filter(|s| *s != 0).unwrap_or(DEFAULT_STATUS)
    }
}
