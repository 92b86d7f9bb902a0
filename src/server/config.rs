//! Configuration loading for advd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.advocate/config.toml` (user)
//! 3. `/etc/advocate/config.toml` (system)
//! 4. built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.advocate/secrets.toml` (user, must be 0600)
//! 2. `/etc/advocate/secrets.toml` (system, must be 0600)
//!
//! Missing secrets fall back to environment variables.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::providers::DEFAULT_MODELS;
use crate::providers::gemini::DEFAULT_BASE_URL;
use crate::quota::FreeTierConfig;
use crate::{AdvocateError, Result};

/// Environment variables consulted for provider keys, in priority order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GEMINI_API_KEY_2", "GEMINI_API_KEY_3"];

/// Environment variable consulted for the admin bearer token.
pub const ADMIN_TOKEN_ENV_VAR: &str = "ADVOCATE_ADMIN_TOKEN";

/// Environment variable overriding `[cache] expiry_hours`.
pub const CACHE_EXPIRY_ENV_VAR: &str = "ADVOCATE_CACHE_EXPIRY_HOURS";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub free_tier: FreeTierSection,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8741).
    #[serde(default = "default_address")]
    pub address: String,
    /// Per-request timeout in seconds (default: 120).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_address() -> String {
    "127.0.0.1:8741".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Hours before a cached answer stops being served (default: 48).
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: u64,
    /// Maximum cached answers (default: 10,000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            expiry_hours: default_expiry_hours(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_expiry_hours() -> u64 {
    48
}

fn default_max_entries() -> u64 {
    10_000
}

/// Text provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSection {
    /// Gemini API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Models in fallback order.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Per-call timeout in seconds (default: 60).
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: default_models(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

fn default_provider_timeout() -> u64 {
    60
}

/// Free-tier limits.
#[derive(Debug, Clone, Deserialize)]
pub struct FreeTierSection {
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default = "default_window_hours")]
    pub window_hours: u64,
    #[serde(default = "default_min_issue_chars")]
    pub min_issue_chars: usize,
}

impl Default for FreeTierSection {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            window_hours: default_window_hours(),
            min_issue_chars: default_min_issue_chars(),
        }
    }
}

fn default_daily_limit() -> u32 {
    5
}

fn default_window_hours() -> u64 {
    24
}

fn default_min_issue_chars() -> usize {
    10
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first existing
    /// standard file is used, or defaults if there is none. Environment
    /// overrides are applied last.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Config::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AdvocateError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            AdvocateError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(CACHE_EXPIRY_ENV_VAR) {
            self.cache.expiry_hours = raw.trim().parse().map_err(|e| {
                AdvocateError::Configuration(format!(
                    "{CACHE_EXPIRY_ENV_VAR} must be a whole number of hours: {e}"
                ))
            })?;
        }
        Ok(())
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(AdvocateError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".advocate").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/advocate/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.cache.max_entries)
            .expiry_hours(self.cache.expiry_hours)
    }

    pub fn free_tier_config(&self) -> FreeTierConfig {
        FreeTierConfig {
            daily_limit: self.free_tier.daily_limit,
            window: Duration::from_secs(self.free_tier.window_hours.saturating_mul(3600)),
            min_issue_chars: self.free_tier.min_issue_chars,
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    /// Provider API keys in priority order.
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// Bearer tokens accepted on authenticated routes.
    #[serde(default)]
    pub admin_tokens: Vec<String>,
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.advocate/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/advocate/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (keys may come from env vars).
    pub fn load() -> Result<Self> {
        // Try user secrets first
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".advocate").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        // Try system secrets
        let system_secrets = PathBuf::from("/etc/advocate/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a secrets file after checking its permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            AdvocateError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            AdvocateError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            AdvocateError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(AdvocateError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Provider keys from the file, or from `GEMINI_API_KEY*` if the file has none.
    pub fn api_keys(&self) -> Vec<String> {
        self.api_keys_with(|name| std::env::var(name).ok())
    }

    /// Admin tokens from the file, or from `ADVOCATE_ADMIN_TOKEN` if the file has none.
    pub fn admin_tokens(&self) -> Vec<String> {
        self.admin_tokens_with(|name| std::env::var(name).ok())
    }

    fn api_keys_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let from_file = non_blank(&self.api_keys);
        if !from_file.is_empty() {
            return from_file;
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .filter(|key| !key.trim().is_empty())
            .collect()
    }

    fn admin_tokens_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let from_file = non_blank(&self.admin_tokens);
        if !from_file.is_empty() {
            return from_file;
        }
        lookup(ADMIN_TOKEN_ENV_VAR)
            .filter(|token| !token.trim().is_empty())
            .into_iter()
            .collect()
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect()
}
