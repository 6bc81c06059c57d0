use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[readonly::make]
pub struct ApiServer {
    pub bind_address: String,
}

impl Default for ApiServer {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:21380".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[readonly::make]
pub struct StoreSettings {
    /// YAML file the in-memory store is seeded from
    pub fixtures: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub api: ApiServer,
    #[serde(default)]
    pub store: StoreSettings,
}

impl Settings {
    pub fn get_environment() -> Environment {
        Environment::default()
            .prefix("COURSEGATE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("COURSEGATE_RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("api.bind_address", "0.0.0.0:21380")?
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::get_environment());

        Self::from_config(builder.build()?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let mut settings: Settings = config.try_deserialize()?;

        // Special strings allow disabling the fixtures via environment
        // variables, even if set in the default config
        settings.store.fixtures = settings.check_if_optional(&settings.store.fixtures);
        Ok(settings)
    }

    fn check_if_optional(&self, s: &Option<String>) -> Option<String> {
        match s {
            None => None,
            Some(s) => match s.to_lowercase().as_str() {
                "" | "no" | "false" | "0" => None,
                _ => Some(s.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_file() {
        let builder = Config::builder().add_source(File::with_name("tests/test_settings.yaml"));

        let settings = Settings::from_config(builder.build().unwrap()).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.api.bind_address, "127.0.0.1:9999");
        assert_eq!(
            settings.store.fixtures.as_deref(),
            Some("tests/test_fixtures.yaml")
        );
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let builder = Config::builder().set_override("debug", false).unwrap();

        let settings = Settings::from_config(builder.build().unwrap()).unwrap();
        assert_eq!(settings.api.bind_address, "0.0.0.0:21380");
        assert!(settings.store.fixtures.is_none());
    }

    #[test]
    fn test_fixtures_can_be_disabled() {
        let builder = Config::builder()
            .add_source(File::with_name("tests/test_settings.yaml"))
            .set_override("store.fixtures", "no")
            .unwrap();

        let settings = Settings::from_config(builder.build().unwrap()).unwrap();
        assert!(settings.store.fixtures.is_none());
    }

    #[test]
    fn test_environment_overrides_file() {
        env::set_var("COURSEGATE__API__BIND_ADDRESS", "10.0.0.1:8080");

        let builder = Config::builder()
            .add_source(File::with_name("tests/test_settings.yaml"))
            .add_source(Settings::get_environment());
        let settings = Settings::from_config(builder.build().unwrap()).unwrap();

        env::remove_var("COURSEGATE__API__BIND_ADDRESS");

        assert_eq!(settings.api.bind_address, "10.0.0.1:8080");
    }
}
