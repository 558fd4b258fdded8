//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - a capacity or the background refresh bound is 0
    /// - the windows are not ordered `0 < fresh < stale <= max_age`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `generation_timeout_ms` is below one second
    /// - only one of the KV url and token is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_capacity == 0 {
            return Err(ConfigError::Invalid { field: "memory_capacity".into(), reason: "must be greater than 0".into() });
        }
        if self.persistent_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "persistent_capacity".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.fresh_secs == 0 {
            return Err(ConfigError::Invalid { field: "fresh_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.fresh_secs >= self.stale_secs {
            return Err(ConfigError::Invalid { field: "fresh_secs".into(), reason: "must be less than stale_secs".into() });
        }
        if self.stale_secs > self.max_age_secs {
            return Err(ConfigError::Invalid {
                field: "stale_secs".into(),
                reason: "must not exceed max_age_secs".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.generation_timeout_ms < 1000 {
            return Err(ConfigError::Invalid {
                field: "generation_timeout_ms".into(),
                reason: "must be at least 1000ms".into(),
            });
        }

        if self.max_background_refreshes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_background_refreshes".into(),
                reason: "must be greater than 0".into(),
            });
        }

        match (&self.kv_rest_url, &self.kv_rest_token) {
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    field: "kv_rest_token".into(),
                    reason: "required when kv_rest_url is set".into(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    field: "kv_rest_url".into(),
                    reason: "required when kv_rest_token is set".into(),
                });
            }
            _ => {}
        }

        if !self.filesystem_enabled && self.kv_credentials().is_none() {
            tracing::warn!(
                memory_capacity = self.memory_capacity,
                "Filesystem and distributed tiers are both disabled; \
                 audits will not survive a restart"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = AppConfig { memory_capacity: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "memory_capacity"));

        let config = AppConfig { persistent_capacity: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "persistent_capacity"));
    }

    #[test]
    fn test_validate_window_order() {
        let config = AppConfig { fresh_secs: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "fresh_secs"));

        let config = AppConfig { fresh_secs: 100, stale_secs: 100, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "fresh_secs"));

        let config = AppConfig { stale_secs: 700_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "stale_secs"));
    }

    #[test]
    fn test_validate_stale_equal_to_max_age() {
        let config = AppConfig { stale_secs: 3600, max_age_secs: 3600, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_generation_timeout() {
        let config = AppConfig { generation_timeout_ms: 999, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "generation_timeout_ms"));
    }

    #[test]
    fn test_validate_background_bound() {
        let config = AppConfig { max_background_refreshes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_background_refreshes"));
    }

    #[test]
    fn test_validate_kv_pairing() {
        let config = AppConfig { kv_rest_url: Some("https://kv.example".into()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "kv_rest_token"));

        let config = AppConfig { kv_rest_token: Some("t".into()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "kv_rest_url"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            memory_capacity: 1,
            persistent_capacity: 1,
            timeout_ms: 100,
            generation_timeout_ms: 1000,
            max_background_refreshes: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
