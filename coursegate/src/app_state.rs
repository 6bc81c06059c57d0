use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use coursegate_core::authorization::AuthorizationGate;
use coursegate_core::store::{Fixtures, SharedResourceStore};

use crate::settings::config::Settings;
use crate::stop_flag;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stop_flag: stop_flag::StopFlag,
    pub store: SharedResourceStore,
    pub gate: AuthorizationGate,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<SharedAppState> {
        let stop_flag = stop_flag::StopFlag::new();
        stop_flag::register_signal_handler(&stop_flag);

        Self::from_settings(settings, stop_flag).await
    }

    /// Build the state without touching signal handlers, used by the cli
    /// and by tests
    pub async fn from_settings(
        settings: Settings,
        stop_flag: stop_flag::StopFlag,
    ) -> anyhow::Result<SharedAppState> {
        let store = match &settings.store.fixtures {
            Some(path) => {
                let fixtures = Fixtures::load(path)
                    .await
                    .with_context(|| format!("Failed to load fixtures from {path}"))?;
                SharedResourceStore::from_fixtures(fixtures)
            }
            None => {
                warn!("No fixtures configured, starting with an empty store");
                SharedResourceStore::new()
            }
        };

        // Building the gate verifies that every (kind, action) pair has a policy
        let gate = AuthorizationGate::new(Arc::new(store.clone()))
            .context("Policy table is incomplete")?;

        info!(
            "Authorization gate initialized with {} policies",
            gate.policies().len()
        );

        Ok(Arc::new(AppState {
            settings,
            stop_flag,
            store,
            gate,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File};

    #[tokio::test]
    async fn test_state_from_settings_loads_fixtures() {
        let config = Config::builder()
            .add_source(File::with_name("tests/test_settings.yaml"))
            .build()
            .unwrap();
        let settings = Settings::from_config(config).unwrap();

        let state = AppState::from_settings(settings, stop_flag::StopFlag::new())
            .await
            .unwrap();
        assert_eq!(state.gate.policies().len(), 42);

        use coursegate_core::store::ResourceStore;
        assert!(state.store.is_enrolled(7, 6).await.unwrap());
    }

    #[tokio::test]
    async fn test_state_with_missing_fixtures_fails() {
        let config = Config::builder()
            .add_source(File::with_name("tests/test_settings.yaml"))
            .set_override("store.fixtures", "tests/does_not_exist.yaml")
            .unwrap()
            .build()
            .unwrap();
        let settings = Settings::from_config(config).unwrap();

        let err = AppState::from_settings(settings, stop_flag::StopFlag::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does_not_exist.yaml"));
    }

    #[tokio::test]
    async fn test_state_with_invalid_fixtures_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.yaml");
        std::fs::write(&path, "lessons:\n  - { id: 42, course_id: 7 }\n").unwrap();

        let config = Config::builder()
            .set_override("store.fixtures", path.to_string_lossy().to_string())
            .unwrap()
            .build()
            .unwrap();
        let settings = Settings::from_config(config).unwrap();

        let err = AppState::from_settings(settings, stop_flag::StopFlag::new())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to load fixtures"));
    }
}
