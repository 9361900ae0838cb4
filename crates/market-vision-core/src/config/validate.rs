//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Upper bound for `server.body_limit_mb`.
pub(crate) const MAX_BODY_LIMIT_MB: usize = 1024;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be > 0".into(),
            ));
        }
        if self.server.body_limit_mb == 0 || self.server.body_limit_mb > MAX_BODY_LIMIT_MB {
            return Err(ConfigError::ValidationError(format!(
                "server.body_limit_mb must be between 1 and {MAX_BODY_LIMIT_MB}, got {}",
                self.server.body_limit_mb
            )));
        }
        if self.gemini.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "gemini.timeout_ms must be > 0".into(),
            ));
        }
        if self.gemini.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.endpoint must not be empty".into(),
            ));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must not be empty".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}
