//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Values come from an optional `quote-engine` file
//! (YAML, TOML or JSON) in the working directory, overridden by environment
//! variables with the `QUOTE_ENGINE` prefix and `__` as the nesting separator.
//!
//! # Example
//!
//! ```no_run
//! use cargo_quote_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Sweeping every {:?}", config.sweeper.interval());
//! ```

mod database;
mod error;
mod runtime;
mod sweeper;
mod underwriting;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use runtime::{Environment, RuntimeConfig};
pub use sweeper::SweeperConfig;
pub use underwriting::UnderwritingConfig;

use serde::Deserialize;

/// Base name of the optional configuration file.
pub const CONFIG_FILE: &str = "quote-engine";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "QUOTE_ENGINE";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// PostgreSQL connection; in-memory storage when absent
    pub database: Option<DatabaseConfig>,

    /// Expiration sweeper schedule
    #[serde(default)]
    pub sweeper: SweeperConfig,

    /// Rule set and risk weights
    #[serde(default)]
    pub underwriting: UnderwritingConfig,
}

impl AppConfig {
    /// Load configuration from the optional config file and the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `quote-engine.{yaml,toml,json}` if present
    /// 3. Reads environment variables with `QUOTE_ENGINE` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `QUOTE_ENGINE__DATABASE__URL=...` -> `database.url = ...`
    /// - `QUOTE_ENGINE__SWEEPER__INTERVAL_SECS=30` -> `sweeper.interval_secs = 30`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        Self::load_from(config::File::with_name(CONFIG_FILE).required(false))
    }

    /// Load configuration from an explicit file, then the environment.
    pub fn load_from<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Checks the log filter, database URL and pool bounds, sweep interval,
    /// rule set (including reading `rules_path`) and risk weights.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.runtime.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.sweeper.validate()?;
        self.underwriting.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "QUOTE_ENGINE__DATABASE__URL",
        "QUOTE_ENGINE__RUNTIME__ENVIRONMENT",
        "QUOTE_ENGINE__SWEEPER__INTERVAL_SECS",
        "QUOTE_ENGINE__SWEEPER__ENABLED",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn load_yaml(contents: &str) -> Result<AppConfig, ConfigError> {
        let file = yaml_file(contents);
        AppConfig::load_from(config::File::from(file.path()))
    }

    #[test]
    fn test_load_with_no_sources_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = load_yaml("{}").unwrap();

        assert!(config.database.is_none());
        assert!(config.sweeper.enabled);
        assert!(config.underwriting.rules.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("QUOTE_ENGINE__DATABASE__URL", "postgresql://test@localhost/quotes");
        env::set_var("QUOTE_ENGINE__SWEEPER__INTERVAL_SECS", "15");
        env::set_var("QUOTE_ENGINE__RUNTIME__ENVIRONMENT", "production");
        let result = load_yaml("{}");
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.database.as_ref().map(|db| db.url.as_str()),
            Some("postgresql://test@localhost/quotes")
        );
        assert_eq!(config.sweeper.interval_secs, 15);
        assert!(config.is_production());
    }

    #[test]
    fn test_environment_overrides_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("QUOTE_ENGINE__SWEEPER__ENABLED", "false");
        let result = load_yaml("sweeper:\n  enabled: true\n  interval_secs: 120\n");
        clear_env();

        let config = result.unwrap();
        assert!(!config.sweeper.enabled);
        assert_eq!(config.sweeper.interval_secs, 120);
    }

    #[test]
    fn test_file_carries_rules_and_weights() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = load_yaml(
            r#"
underwriting:
  rules:
    - id: long-cover
      severity: soft
      condition:
        type: coverage_days_outside
        max_days: 90
  risk:
    value_weight: 40
    mode_points:
      ocean: 10
"#,
        )
        .unwrap();

        assert_eq!(config.underwriting.rules.len(), 1);
        assert_eq!(config.underwriting.risk.value_weight, 40.0);
        assert_eq!(config.underwriting.risk.mode_points.get("ocean"), Some(&10.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_database_url() {
        let config = AppConfig {
            database: Some(DatabaseConfig {
                url: "mysql://localhost/quotes".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn test_validate_rejects_bad_sweep_interval() {
        let config = AppConfig {
            sweeper: SweeperConfig {
                interval_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
