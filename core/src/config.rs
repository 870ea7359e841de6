//! Client configuration and the environment-sourced settings surface.
//!
//! `ClientConfig` is what `HttpClient` actually uses on every request.
//! `Settings` mirrors the knobs a deployment usually exposes through
//! `EASYPANEL_*` variables; it turns into a `ClientConfig` plus a transport
//! choice. Retry and cache values are carried for callers that want them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Base URL, token and timeout shared by every call of one client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    auth_token: String,
    timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: &str, auth_token: &str) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            auth_token: auth_token.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn set_base_url(&mut self, base_url: &str) {
        self.base_url = trim_base_url(base_url);
    }

    pub(crate) fn set_auth_token(&mut self, token: &str) {
        self.auth_token = token.to_string();
    }

    pub(crate) fn set_timeout(&mut self, seconds: u64) {
        self.timeout_secs = seconds;
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.auth_token.is_empty() {
            "<none>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &token)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("EASYPANEL_BASE_URL is not set")]
    MissingBaseUrl,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub times: u32,
    pub sleep_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            times: 3,
            sleep_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 300,
            prefix: "easypanel".to_string(),
        }
    }
}

/// Deployment-level configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
    pub verify_ssl: bool,
    pub retry: RetrySettings,
    pub cache: CacheSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_ssl: true,
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_ssl", &self.verify_ssl)
            .field("retry", &self.retry)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Settings {
    /// Reads `EASYPANEL_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Unset and blank keys
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Settings::default();

        Ok(Settings {
            base_url: get("EASYPANEL_BASE_URL"),
            auth_token: get("EASYPANEL_AUTH_TOKEN"),
            timeout_secs: parse_or(
                "EASYPANEL_TIMEOUT",
                get("EASYPANEL_TIMEOUT"),
                defaults.timeout_secs,
            )?,
            verify_ssl: bool_or(
                "EASYPANEL_VERIFY_SSL",
                get("EASYPANEL_VERIFY_SSL"),
                defaults.verify_ssl,
            )?,
            retry: RetrySettings {
                times: parse_or(
                    "EASYPANEL_RETRY_TIMES",
                    get("EASYPANEL_RETRY_TIMES"),
                    defaults.retry.times,
                )?,
                sleep_ms: parse_or(
                    "EASYPANEL_RETRY_SLEEP",
                    get("EASYPANEL_RETRY_SLEEP"),
                    defaults.retry.sleep_ms,
                )?,
            },
            cache: CacheSettings {
                enabled: bool_or(
                    "EASYPANEL_CACHE_ENABLED",
                    get("EASYPANEL_CACHE_ENABLED"),
                    defaults.cache.enabled,
                )?,
                ttl_secs: parse_or(
                    "EASYPANEL_CACHE_TTL",
                    get("EASYPANEL_CACHE_TTL"),
                    defaults.cache.ttl_secs,
                )?,
                prefix: get("EASYPANEL_CACHE_PREFIX").unwrap_or(defaults.cache.prefix),
            },
        })
    }

    /// Client configuration for these settings. A base URL is required;
    /// the token may be absent.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        Ok(ClientConfig::new(base_url, self.auth_token.as_deref().unwrap_or_default())
            .with_timeout(self.timeout_secs))
    }

    pub fn retry_sleep(&self) -> Duration {
        Duration::from_millis(self.retry.sleep_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

fn bool_or(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = ClientConfig::new("https://host.test//", "t");
        assert_eq!(config.base_url(), "https://host.test");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = ClientConfig::new("https://host.test", "super-secret-token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("<redacted>"));

        let settings = Settings {
            auth_token: Some("super-secret-token".into()),
            ..Settings::default()
        };
        assert!(!format!("{settings:?}").contains("super-secret-token"));
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.retry.times, 3);
        assert_eq!(settings.cache.prefix, "easypanel");
        assert_eq!(settings.client_config(), Err(ConfigError::MissingBaseUrl));
    }

    #[test]
    fn environment_values_override_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            ("EASYPANEL_BASE_URL", "https://panel.example.com/"),
            ("EASYPANEL_AUTH_TOKEN", "tok"),
            ("EASYPANEL_TIMEOUT", "10"),
            ("EASYPANEL_VERIFY_SSL", "off"),
            ("EASYPANEL_RETRY_SLEEP", "250"),
            ("EASYPANEL_CACHE_ENABLED", "YES"),
            ("EASYPANEL_CACHE_TTL", "60"),
        ]))
        .unwrap();
        assert!(!settings.verify_ssl);
        assert!(settings.cache.enabled);
        assert_eq!(settings.retry_sleep(), Duration::from_millis(250));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(60));

        let config = settings.client_config().unwrap();
        assert_eq!(config.base_url(), "https://panel.example.com");
        assert_eq!(config.auth_token(), "tok");
        assert_eq!(config.timeout_secs(), 10);
    }

    #[test]
    fn unparsable_values_name_the_key() {
        let err = Settings::from_lookup(lookup(&[("EASYPANEL_TIMEOUT", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "EASYPANEL_TIMEOUT",
                value: "soon".into()
            }
        );
        assert!(Settings::from_lookup(lookup(&[("EASYPANEL_VERIFY_SSL", "maybe")])).is_err());
    }

    #[test]
    fn settings_deserialize_with_partial_fields() {
        let raw = r#"{"base_url":"https://p.test","cache":{"enabled":true}}"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.timeout_secs, 30);
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.ttl_secs, 300);
    }
}
