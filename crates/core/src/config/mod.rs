//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SITEAUDIT_*)
//! 2. Hosted KV credentials (KV_REST_API_URL / KV_REST_API_TOKEN)
//! 3. TOML config file (if SITEAUDIT_CONFIG_FILE set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SITEAUDIT_*)
/// 2. KV_REST_API_URL / KV_REST_API_TOKEN, as exported by hosted KV stores
/// 3. TOML config file (if SITEAUDIT_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one JSON file per cached audit.
    ///
    /// Set via SITEAUDIT_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Whether the filesystem tier is used at all.
    #[serde(default = "default_true")]
    pub filesystem_enabled: bool,

    /// Maximum number of records in the memory tier.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Maximum number of files kept by the filesystem tier.
    #[serde(default = "default_persistent_capacity")]
    pub persistent_capacity: usize,

    /// Age (seconds) below which a record is served without refresh.
    #[serde(default = "default_fresh_secs")]
    pub fresh_secs: u64,

    /// Age (seconds) below which a record is served with a background refresh.
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,

    /// Age (seconds) after which sweeps drop a record; also the KV TTL.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Interval of the memory tier sweep.
    #[serde(default = "default_memory_sweep_secs")]
    pub memory_sweep_secs: u64,

    /// Interval of the filesystem tier sweep.
    #[serde(default = "default_filesystem_sweep_secs")]
    pub filesystem_sweep_secs: u64,

    /// Delay of the opportunistic sweep that follows a filesystem write.
    #[serde(default = "default_post_write_cleanup_ms")]
    pub post_write_cleanup_ms: u64,

    /// REST endpoint of the distributed KV tier.
    ///
    /// Set via SITEAUDIT_KV_REST_URL or KV_REST_API_URL.
    #[serde(default)]
    pub kv_rest_url: Option<String>,

    /// Bearer token of the distributed KV tier.
    ///
    /// Set via SITEAUDIT_KV_REST_TOKEN or KV_REST_API_TOKEN.
    #[serde(default)]
    pub kv_rest_token: Option<String>,

    /// API key for the recommendation model. Without it the local generator is used.
    ///
    /// Set via SITEAUDIT_LLM_API_KEY environment variable.
    #[serde(default)]
    pub llm_api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    /// Outbound HTTP timeout in milliseconds (LLM, KV).
    ///
    /// Set via SITEAUDIT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on one regeneration, in milliseconds.
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,

    /// Maximum concurrently running background refreshes.
    #[serde(default = "default_max_background_refreshes")]
    pub max_background_refreshes: usize,

    /// Collapse concurrent regenerations of the same URL into one.
    #[serde(default = "default_true")]
    pub single_flight: bool,

    /// HTTP listen address.
    ///
    /// Set via SITEAUDIT_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./audit-cache")
}

fn default_true() -> bool {
    true
}

fn default_memory_capacity() -> usize {
    100
}

fn default_persistent_capacity() -> usize {
    1000
}

fn default_fresh_secs() -> u64 {
    30 * 60
}

fn default_stale_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_age_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_memory_sweep_secs() -> u64 {
    6 * 60 * 60
}

fn default_filesystem_sweep_secs() -> u64 {
    24 * 60 * 60
}

fn default_post_write_cleanup_ms() -> u64 {
    1000
}

fn default_llm_model() -> String {
    "gemini-2.0-flash-lite".into()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_generation_timeout_ms() -> u64 {
    60_000
}

fn default_max_background_refreshes() -> usize {
    8
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            filesystem_enabled: true,
            memory_capacity: default_memory_capacity(),
            persistent_capacity: default_persistent_capacity(),
            fresh_secs: default_fresh_secs(),
            stale_secs: default_stale_secs(),
            max_age_secs: default_max_age_secs(),
            memory_sweep_secs: default_memory_sweep_secs(),
            filesystem_sweep_secs: default_filesystem_sweep_secs(),
            post_write_cleanup_ms: default_post_write_cleanup_ms(),
            kv_rest_url: None,
            kv_rest_token: None,
            llm_api_key: None,
            llm_model: default_llm_model(),
            llm_base_url: default_llm_base_url(),
            timeout_ms: default_timeout_ms(),
            generation_timeout_ms: default_generation_timeout_ms(),
            max_background_refreshes: default_max_background_refreshes(),
            single_flight: true,
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    pub fn fresh_window(&self) -> Duration {
        Duration::from_secs(self.fresh_secs)
    }

    pub fn stale_window(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn memory_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.memory_sweep_secs)
    }

    pub fn filesystem_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.filesystem_sweep_secs)
    }

    pub fn post_write_cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.post_write_cleanup_ms)
    }

    /// REST url and token of the distributed tier, when both are configured.
    pub fn kv_credentials(&self) -> Option<(&str, &str)> {
        match (self.kv_rest_url.as_deref(), self.kv_rest_token.as_deref()) {
            (Some(url), Some(token)) => Some((url, token)),
            _ => None,
        }
    }

    /// API key for the recommendation model.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_llm_api_key(&self) -> Result<&str, ConfigError> {
        self.llm_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "llm_api_key".into(),
            hint: "Set SITEAUDIT_LLM_API_KEY environment variable".into(),
        })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SITEAUDIT_`
    /// 2. `KV_REST_API_URL` / `KV_REST_API_TOKEN`
    /// 3. TOML file from `SITEAUDIT_CONFIG_FILE` (if set)
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SITEAUDIT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(Env::raw().only(&["KV_REST_API_URL", "KV_REST_API_TOKEN"]).map(|key| {
            match key.as_str().to_lowercase().as_str() {
                "kv_rest_api_url" => "kv_rest_url".into(),
                "kv_rest_api_token" => "kv_rest_token".into(),
                other => other.to_string().into(),
            }
        }));

        figment = figment.merge(
            Env::prefixed("SITEAUDIT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in_jail() -> figment::Result<AppConfig> {
        AppConfig::load().map_err(|e| figment::Error::from(e.to_string()))
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from("./audit-cache"));
        assert_eq!(config.memory_capacity, 100);
        assert_eq!(config.persistent_capacity, 1000);
        assert_eq!(config.fresh_window(), Duration::from_secs(1800));
        assert_eq!(config.stale_window(), Duration::from_secs(86_400));
        assert_eq!(config.max_age(), Duration::from_secs(604_800));
        assert_eq!(config.memory_sweep_interval(), Duration::from_secs(21_600));
        assert_eq!(config.filesystem_sweep_interval(), Duration::from_secs(86_400));
        assert_eq!(config.post_write_cleanup_delay(), Duration::from_millis(1000));
        assert!(config.filesystem_enabled);
        assert!(config.single_flight);
        assert!(config.kv_credentials().is_none());
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(10_000));
        assert_eq!(config.generation_timeout(), Duration::from_millis(60_000));
    }

    #[test]
    fn test_kv_credentials_require_both() {
        let config = AppConfig { kv_rest_url: Some("https://kv.example".into()), ..Default::default() };
        assert!(config.kv_credentials().is_none());

        let config = AppConfig {
            kv_rest_url: Some("https://kv.example".into()),
            kv_rest_token: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(config.kv_credentials(), Some(("https://kv.example", "secret")));
    }

    #[test]
    fn test_require_llm_api_key() {
        let config = AppConfig::default();
        assert!(matches!(config.require_llm_api_key(), Err(ConfigError::Missing { .. })));

        let config = AppConfig { llm_api_key: Some("key".into()), ..Default::default() };
        assert_eq!(config.require_llm_api_key().unwrap(), "key");
    }

    #[test]
    fn test_load_from_prefixed_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SITEAUDIT_MEMORY_CAPACITY", "5");
            jail.set_env("SITEAUDIT_SINGLE_FLIGHT", "false");
            jail.set_env("SITEAUDIT_CACHE_DIR", "/tmp/audits");

            let config = load_in_jail()?;
            assert_eq!(config.memory_capacity, 5);
            assert!(!config.single_flight);
            assert_eq!(config.cache_dir, PathBuf::from("/tmp/audits"));
            Ok(())
        });
    }

    #[test]
    fn test_load_hosted_kv_variables() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("KV_REST_API_URL", "https://kv.example");
            jail.set_env("KV_REST_API_TOKEN", "token-1");

            let config = load_in_jail()?;
            assert_eq!(config.kv_credentials(), Some(("https://kv.example", "token-1")));
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_overrides_hosted_kv_variables() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("KV_REST_API_URL", "https://kv.example");
            jail.set_env("KV_REST_API_TOKEN", "token-1");
            jail.set_env("SITEAUDIT_KV_REST_TOKEN", "token-2");

            let config = load_in_jail()?;
            assert_eq!(config.kv_rest_token.as_deref(), Some("token-2"));
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_below_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("siteaudit.toml", "memory_capacity = 42\nfresh_secs = 60\n")?;
            jail.set_env("SITEAUDIT_CONFIG_FILE", "siteaudit.toml");
            jail.set_env("SITEAUDIT_FRESH_SECS", "120");

            let config = load_in_jail()?;
            assert_eq!(config.memory_capacity, 42);
            assert_eq!(config.fresh_secs, 120);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_windows() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SITEAUDIT_FRESH_SECS", "90000");

            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "fresh_secs"));
            Ok(())
        });
    }
}
