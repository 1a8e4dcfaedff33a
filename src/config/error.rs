//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid log filter '{0}'")]
    InvalidLogFilter(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool max_connections must be at least 1 and at least min_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed ({0})")]
    PoolSizeTooLarge(u32),

    #[error("Database connect timeout must be at least 1 second")]
    InvalidConnectTimeout,

    #[error("Sweep interval must be between 1 and 86400 seconds")]
    InvalidSweepInterval,

    #[error("Set either underwriting.rules or underwriting.rules_path, not both")]
    ConflictingRuleSources,

    #[error("Cannot read rules file {path}: {reason}")]
    RulesFileUnreadable { path: PathBuf, reason: String },

    #[error("Invalid underwriting configuration: {0}")]
    Underwriting(#[from] crate::domain::foundation::ValidationError),
}
