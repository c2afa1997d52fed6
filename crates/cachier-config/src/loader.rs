//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use cachier_core::CachierError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use tracing::{debug, info};

/// Prefix for environment overrides, e.g. `CACHIER__CACHE__TTL_SECS=30`.
pub const ENV_PREFIX: &str = "CACHIER";

/// Loads and validates the layered configuration once at startup.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Untracked local overrides
    /// 4. Environment variables with the `CACHIER__` prefix
    pub fn new(config_dir: impl AsRef<Path>) -> Result<Self, CachierError> {
        let config = Self::load_config(config_dir.as_ref())?;
        info!("Configuration loaded from {}", config_dir.as_ref().display());
        Ok(Self { config })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, CachierError> {
        Self::new("./config")
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub const fn get(&self) -> &AppConfig {
        &self.config
    }

    fn load_config(config_dir: &Path) -> Result<AppConfig, CachierError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("CACHIER_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        debug!(
            config_dir = %config_dir.display(),
            environment = %environment,
            "Loading configuration"
        );

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = config_dir.join(format!("{name}.toml"));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error_to_cachier_error)?;

        ConfigValidator::validate(&app_config)
            .map_err(|errors| CachierError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }
}

fn config_error_to_cachier_error(err: ConfigError) -> CachierError {
    CachierError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(dir.path().join("absent")).unwrap();
        let config = loader.get();
        assert_eq!(config.cache.ttl_secs, 45);
        assert_eq!(config.server.rest_port, 8080);
    }

    #[test]
    fn test_files_are_layered() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[cache]\nttl_secs = 60\nfail_open = false\n");
        write(&dir, "local.toml", "[cache]\nttl_secs = 5\n");

        let loader = ConfigLoader::new(dir.path()).unwrap();
        let config = loader.get();
        assert_eq!(config.cache.ttl_secs, 5);
        assert!(!config.cache.fail_open);
        assert!(config.cache.single_flight);
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let dir = TempDir::new().unwrap();
        write(&dir, "default.toml", "[cache]\nttl_secs = 0\n");

        let err = ConfigLoader::new(dir.path()).err().unwrap();
        assert!(matches!(err, CachierError::Configuration(msg) if msg.contains("cache.ttl_secs")));
    }
}
