//! Layered configuration loading
//!
//! Environment variables (and `.env`) give the base values, an optional
//! `config/<environment>` file overrides them and `HEALLINK__SECTION__KEY`
//! variables override both.

use config::{Config, ConfigError, File};
use thiserror::Error;

use hl_shared::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load, merge and validate the application configuration
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    dotenvy::dotenv().ok();

    let base = AppConfig::from_env();
    let config_file = base.environment.config_file();

    let settings: AppConfig = Config::builder()
        .add_source(Config::try_from(&base)?)
        .add_source(File::with_name(&config_file).required(false))
        .add_source(
            config::Environment::with_prefix("HEALLINK")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    settings.validate().map_err(ConfigLoadError::Invalid)?;
    Ok(settings)
}
