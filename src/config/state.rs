// Application state module
// Runtime state shared by every connection of one server

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::mocks::MockRegistry;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Directory static requests resolve under
    pub static_root: PathBuf,
    /// Registered mocks, scoped to this server instance
    pub mocks: MockRegistry,
    /// Notified when the server should stop accepting connections
    pub shutdown: Arc<Notify>,
    access_log: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            static_root: PathBuf::from(&config.static_files.root),
            mocks: MockRegistry::new(),
            shutdown: Arc::new(Notify::new()),
            access_log: config.logging.access_log,
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;

    #[test]
    fn test_state_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent").to_string_lossy().into_owned();
        let overrides = Overrides {
            root: Some("public".to_string()),
            ..Overrides::default()
        };
        let mut config = Config::load_from(&missing, &overrides).unwrap();
        assert!(AppState::new(&config).access_log_enabled());

        config.logging.access_log = false;
        let state = AppState::new(&config);
        assert!(!state.access_log_enabled());
        assert_eq!(state.static_root, PathBuf::from("public"));
        assert!(state.mocks.is_empty());
    }
}
