//! Expiration sweeper configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ExpirationWorkerConfig;

const MAX_INTERVAL_SECS: u64 = 86_400;

/// Sweeper configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    /// Run the expiration worker at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Sweep immediately on startup
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
}

impl SweeperConfig {
    /// Get the sweep interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Settings for the expiration worker.
    pub fn worker_config(&self) -> ExpirationWorkerConfig {
        ExpirationWorkerConfig::default()
            .with_sweep_interval(self.interval())
            .with_run_on_start(self.run_on_start)
    }

    /// Validate sweeper configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 || self.interval_secs > MAX_INTERVAL_SECS {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval(),
            run_on_start: default_run_on_start(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> u64 {
    60
}

fn default_run_on_start() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweeper_defaults() {
        let config = SweeperConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_config_follows_settings() {
        let config = SweeperConfig {
            interval_secs: 15,
            run_on_start: false,
            ..Default::default()
        };
        let worker = config.worker_config();
        assert_eq!(worker.sweep_interval, Duration::from_secs(15));
        assert!(!worker.run_on_start);
    }

    #[test]
    fn test_validation_interval_bounds() {
        for interval_secs in [0, MAX_INTERVAL_SECS + 1] {
            let config = SweeperConfig {
                interval_secs,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::InvalidSweepInterval)
            ));
        }
    }
}
