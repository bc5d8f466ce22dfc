//! Configuration loading.
//!
//! Sources are layered, later ones winning: built-in defaults, an optional
//! `config/default.*` file (or an explicit path), then `POSTBOX_*` environment
//! variables using `__` between nesting levels, e.g.
//! `POSTBOX_BROKER__MAX_TIMEOUT_SECS=10`.

mod settings;

use std::path::Path;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{BrokerSettings, LoggingSettings, ServerSettings, Settings};

const DEFAULT_CONFIG_FILE: &str = "config/default";
const ENV_PREFIX: &str = "POSTBOX";

/// Loads the configuration from the default file location and the environment.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(None)
}

/// Loads the configuration, reading `path` instead of the default file when
/// given. An explicit path must exist; the default file is optional.
pub fn load_config_from(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Try to deserialize what is available, then merge with defaults
    let partial: PartialSettings = config.try_deserialize()?;
    let settings = partial.merge(Settings::default());

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.broker.personal_capacity == 0 {
        return Err(ConfigError::Message(
            "broker.personal_capacity must be greater than zero".to_string(),
        ));
    }
    if settings.broker.sweep_interval_ms == 0 {
        return Err(ConfigError::Message(
            "broker.sweep_interval_ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
