//! Configuration loading utilities

use thiserror::Error;

use crate::settings::{ConfigValidationError, Settings};

/// Environment variable naming the config file (without extension)
const CONFIG_PATH_ENV: &str = "XBRIDGE_CONFIG";

/// Errors while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigLoadError {
	#[error("failed to read configuration: {0}")]
	Read(#[from] config::ConfigError),

	#[error(transparent)]
	Validation(#[from] ConfigValidationError),
}

/// Load configuration from the file named by `XBRIDGE_CONFIG` (falling back
/// to `config/config`), merged over defaults; a missing file yields defaults
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config/config".to_string());

	let loaded = config::Config::builder()
		.add_source(config::File::with_name(&path).required(false))
		.add_source(config::Environment::with_prefix("XBRIDGE").separator("__"))
		.build()?;

	let settings: Settings = loaded.try_deserialize()?;
	settings.validate()?;

	Ok(settings)
}
