use config::{Config, File};

use coursegate::app_state::{AppState, SharedAppState};
use coursegate::settings::config::Settings;
use coursegate::stop_flag::StopFlag;

/// App state seeded from `tests/test_fixtures.yaml`
pub async fn create_test_app_state() -> SharedAppState {
    let config = Config::builder()
        .add_source(File::with_name("tests/test_settings.yaml"))
        .build()
        .unwrap();
    let settings = Settings::from_config(config).unwrap();

    AppState::from_settings(settings, StopFlag::new())
        .await
        .unwrap()
}
