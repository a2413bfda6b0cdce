//! Configuration system for keytrial.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `keytrial.toml` file
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! All configuration options can be overridden via environment variables:
//! - `KEYTRIAL_KEY_FILE` - Path to the key list file
//! - `KEYTRIAL_POST_ACTION_DELAY_SECS` - Settle delay after install/activate
//! - `KEYTRIAL_INSTALL_TIMEOUT_SECS` - Timeout for the key install command
//! - `KEYTRIAL_ACTIVATE_TIMEOUT_SECS` - Timeout for the online activation command
//! - `KEYTRIAL_STATUS_TIMEOUT_SECS` - Timeout for the status query commands
//! - `KEYTRIAL_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
//!
//! The loaded configuration is passed into [`TrialRunner`](crate::runner::TrialRunner)
//! explicitly; there is no process-wide singleton.

use std::env;
use std::time::Duration;

use config::Config;
use serde::Deserialize;

use crate::errors::{TrialError, TrialResult};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Trial loop configuration
    pub trial: TrialSettings,
    /// Per-command timeout configuration
    pub timeouts: TimeoutConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trial loop configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrialSettings {
    /// Path to the key list file (one candidate key per line)
    pub key_file: String,
    /// Seconds to wait after each install/activate call so the licensing
    /// service can settle before the next check
    pub post_action_delay_secs: u64,
}

impl Default for TrialSettings {
    fn default() -> Self {
        Self {
            key_file: "keys.txt".to_string(),
            post_action_delay_secs: 3,
        }
    }
}

impl TrialSettings {
    /// Settle delay as a [`Duration`]. Zero disables the delay.
    pub fn post_action_delay(&self) -> Duration {
        Duration::from_secs(self.post_action_delay_secs)
    }
}

/// Per-command timeout configuration, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for the key install command
    pub install_secs: u64,
    /// Timeout for the online activation command (activation may have to
    /// reach the activation servers, so it gets a longer allowance)
    pub activate_secs: u64,
    /// Timeout for the status query commands
    pub status_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            install_secs: 60,
            activate_secs: 120,
            status_secs: 60,
        }
    }
}

impl TimeoutConfig {
    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }

    pub fn activate(&self) -> Duration {
        Duration::from_secs(self.activate_secs)
    }

    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TrialConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. `keytrial.toml` file (optional)
    /// 3. Environment variables
    pub fn load() -> TrialResult<Self> {
        let builder = Config::builder()
            // Start with defaults
            .set_default("trial.key_file", "keys.txt")
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_default("trial.post_action_delay_secs", 3)
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_default("timeouts.install_secs", 60)
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_default("timeouts.activate_secs", 120)
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_default("timeouts.status_secs", 60)
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_default("logging.level", "info")
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            // Load from keytrial.toml (optional)
            .add_source(config::File::with_name("keytrial").required(false))
            // Override with environment variables
            .set_override_option("trial.key_file", env::var("KEYTRIAL_KEY_FILE").ok())
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_override_option(
                "trial.post_action_delay_secs",
                env::var("KEYTRIAL_POST_ACTION_DELAY_SECS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_override_option(
                "timeouts.install_secs",
                env::var("KEYTRIAL_INSTALL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_override_option(
                "timeouts.activate_secs",
                env::var("KEYTRIAL_ACTIVATE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_override_option(
                "timeouts.status_secs",
                env::var("KEYTRIAL_STATUS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(|e| TrialError::ConfigError(e.to_string()))?
            .set_override_option("logging.level", env::var("KEYTRIAL_LOG_LEVEL").ok())
            .map_err(|e| TrialError::ConfigError(e.to_string()))?;

        let settings = builder
            .build()
            .map_err(|e| TrialError::ConfigError(format!("failed to build config: {e}")))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| TrialError::ConfigError(format!("failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> TrialResult<()> {
        if self.trial.key_file.is_empty() {
            return Err(TrialError::ConfigError(
                "trial.key_file cannot be empty".to_string(),
            ));
        }

        if self.timeouts.install_secs == 0 {
            return Err(TrialError::ConfigError(
                "timeouts.install_secs must be greater than 0".to_string(),
            ));
        }
        if self.timeouts.activate_secs == 0 {
            return Err(TrialError::ConfigError(
                "timeouts.activate_secs must be greater than 0".to_string(),
            ));
        }
        if self.timeouts.status_secs == 0 {
            return Err(TrialError::ConfigError(
                "timeouts.status_secs must be greater than 0".to_string(),
            ));
        }

        // Validate log level
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(TrialError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = TrialConfig::default();
        assert_eq!(config.trial.key_file, "keys.txt");
        assert_eq!(config.trial.post_action_delay_secs, 3);
        assert_eq!(config.timeouts.install_secs, 60);
        assert_eq!(config.timeouts.activate_secs, 120);
        assert_eq!(config.timeouts.status_secs, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn default_config_validates() {
        assert!(TrialConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_key_file() {
        let mut config = TrialConfig::default();
        config.trial.key_file = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let mut config = TrialConfig::default();
        config.timeouts.activate_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let mut config = TrialConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn timeout_accessors_are_durations() {
        let config = TrialConfig::default();
        assert_eq!(config.timeouts.activate(), Duration::from_secs(120));
        assert_eq!(config.trial.post_action_delay(), Duration::from_secs(3));
    }
}
