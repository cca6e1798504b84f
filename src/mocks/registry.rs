// Mock registry
// In-memory store of mock definitions keyed by request path

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::matcher::{self, QueryParams};
use super::{MockDefinition, MockResponse};

/// Registry of mock definitions, one per url
///
/// Every operation takes the lock for a single synchronous step and never
/// holds it across an `.await`.
#[derive(Debug, Default)]
pub struct MockRegistry {
    mocks: Mutex<BTreeMap<String, MockDefinition>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, MockDefinition>> {
        self.mocks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the definition for its url, with `called` reset
    pub fn register(&self, mut definition: MockDefinition) {
        definition.called = false;
        self.entries().insert(definition.url.clone(), definition);
    }

    /// Remove every definition
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// True when every registered definition has been called (or none exist)
    pub fn all_called(&self) -> bool {
        self.entries().values().all(|m| m.called)
    }

    /// Exact path lookup, returning a copy for inspection
    ///
    /// Request handling goes through [`fulfill`](Self::fulfill), which
    /// matches and marks the definition under a single lock.
    pub fn lookup(&self, url: &str) -> Option<MockDefinition> {
        self.entries().get(url).cloned()
    }

    /// Match a request against the definition for `path` and mark it called
    ///
    /// Returns the status and response to send, or `None` when nothing matches.
    pub fn fulfill(
        &self,
        path: &str,
        method: &str,
        query: &QueryParams,
    ) -> Option<(u16, MockResponse)> {
        let mut entries = self.entries();
        let definition = entries.get_mut(path)?;
        if !matcher::matches(Some(&*definition), method, query) {
            return None;
        }
        definition.called = true;
        Some((definition.effective_status(), definition.response.clone()))
    }

    /// Copy of the whole registry, for the meta dump
    pub fn snapshot(&self) -> BTreeMap<String, MockDefinition> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mock(url: &str, params: &[(&str, &str)], body: &str) -> MockDefinition {
        MockDefinition {
            url: url.to_string(),
            method: "GET".to_string(),
            params: params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            status: None,
            response: MockResponse {
                body: body.to_string(),
            },
            called: false,
        }
    }

    #[test]
    fn test_empty_registry_all_called() {
        let registry = MockRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.all_called());
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = MockRegistry::new();
        registry.register(make_mock("/api/x", &[], "one"));

        let found = registry.lookup("/api/x").unwrap();
        assert_eq!(found.response.body, "one");
        assert!(registry.lookup("/api/y").is_none());
        assert!(registry.lookup("/api/x/").is_none());
        assert!(!registry.all_called());
    }

    #[test]
    fn test_register_replaces_and_resets_called() {
        let registry = MockRegistry::new();
        registry.register(make_mock("/api/x", &[], "first"));
        assert!(registry.fulfill("/api/x", "GET", &QueryParams::new()).is_some());
        assert!(registry.all_called());

        registry.register(make_mock("/api/x", &[], "second"));
        assert_eq!(registry.len(), 1);
        let found = registry.lookup("/api/x").unwrap();
        assert_eq!(found.response.body, "second");
        assert!(!found.called);
        assert!(!registry.all_called());
    }

    #[test]
    fn test_register_forces_called_false() {
        let registry = MockRegistry::new();
        let mut mock = make_mock("/api/x", &[], "");
        mock.called = true;
        registry.register(mock);
        assert!(!registry.lookup("/api/x").unwrap().called);
    }

    #[test]
    fn test_clear_makes_all_called_true() {
        let registry = MockRegistry::new();
        registry.register(make_mock("/a", &[], ""));
        registry.register(make_mock("/b", &[], ""));
        assert!(!registry.all_called());

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.all_called());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_fulfill_marks_called() {
        let registry = MockRegistry::new();
        registry.register(make_mock("/api/x", &[("id", "5")], r#"{"ok":true}"#));

        let query: QueryParams = [("id".to_string(), "6".to_string())].into();
        assert!(registry.fulfill("/api/x", "GET", &query).is_none());
        assert!(!registry.lookup("/api/x").unwrap().called);

        let query: QueryParams = [("id".to_string(), "5".to_string())].into();
        let (status, response) = registry.fulfill("/api/x", "GET", &query).unwrap();
        assert_eq!(status, 200);
        assert_eq!(response.body, r#"{"ok":true}"#);
        assert!(registry.lookup("/api/x").unwrap().called);
    }

    #[test]
    fn test_all_called_requires_every_mock() {
        let registry = MockRegistry::new();
        registry.register(make_mock("/a", &[], ""));
        registry.register(make_mock("/b", &[], ""));

        registry.fulfill("/a", "GET", &QueryParams::new());
        assert!(!registry.all_called());

        registry.fulfill("/b", "GET", &QueryParams::new());
        assert!(registry.all_called());
    }

    #[test]
    fn test_fulfill_unknown_path() {
        let registry = MockRegistry::new();
        assert!(registry.fulfill("/nope", "GET", &QueryParams::new()).is_none());
    }
}
