use config::{Config, ConfigError, File};
use ferry_core::Environment;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub environment: Environment,
    #[serde(with = "humantime_serde")]
    pub feed_poll_interval: std::time::Duration,
    pub feed_buffer_size: usize,
}

impl Settings {
    /// Loads the settings file selected by `APP_ENVIRONMENT` (defaulting to
    /// `local`), with `FERRY_TRACKER`-prefixed environment variables taking
    /// precedence.
    pub fn new() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string());

        Config::builder()
            .add_source(
                File::with_name(&format!("config/{}.yml", environment.to_lowercase()))
                    .required(true),
            )
            .add_source(config::Environment::with_prefix("FERRY_TRACKER").separator("__"))
            .build()?
            .try_deserialize()
    }
}
