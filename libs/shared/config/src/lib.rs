use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SUCCESS_DISMISS_SECS: u64 = 5;
pub const DEFAULT_DOCTOR_SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub success_dismiss_secs: u64,
    pub doctor_search_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            success_dismiss_secs: DEFAULT_SUCCESS_DISMISS_SECS,
            doctor_search_debounce_ms: DEFAULT_DOCTOR_SEARCH_DEBOUNCE_MS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("CLINIC_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_BASE_URL not set, using default");
                    DEFAULT_API_BASE_URL.to_string()
                }),
            request_timeout_secs: parse_or_default(
                "CLINIC_API_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            success_dismiss_secs: parse_or_default(
                "BOOKING_SUCCESS_DISMISS_SECS",
                DEFAULT_SUCCESS_DISMISS_SECS,
            ),
            doctor_search_debounce_ms: parse_or_default(
                "DOCTOR_SEARCH_DEBOUNCE_MS",
                DEFAULT_DOCTOR_SEARCH_DEBOUNCE_MS,
            ),
        };

        if !config.is_configured() {
            warn!("Clinic API base URL is not an absolute http(s) URL: {:?}", config.api_base_url);
        }

        config
    }

    /// Builds a config pointing at `base_url` with every other setting at its default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn success_dismiss_delay(&self) -> Duration {
        Duration::from_secs(self.success_dismiss_secs)
    }

    pub fn doctor_search_debounce(&self) -> Duration {
        Duration::from_millis(self.doctor_search_debounce_ms)
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("{} has invalid value {:?} ({}), using default {}", key, raw, e, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.success_dismiss_delay(), Duration::from_secs(5));
        assert_eq!(config.doctor_search_debounce(), Duration::from_millis(300));
        assert!(config.is_configured());
    }

    #[test]
    fn test_with_base_url_keeps_defaults() {
        let config = AppConfig::with_base_url("http://127.0.0.1:9999/api");

        assert_eq!(config.api_base_url, "http://127.0.0.1:9999/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_relative_base_url_is_not_configured() {
        let config = AppConfig::with_base_url("/api");
        assert!(!config.is_configured());

        let config = AppConfig::with_base_url("");
        assert!(!config.is_configured());
    }

    #[test]
    fn test_parse_or_default_falls_back_on_garbage() {
        env::set_var("SHARED_CONFIG_TEST_GARBAGE", "not-a-number");
        assert_eq!(parse_or_default("SHARED_CONFIG_TEST_GARBAGE", 7u64), 7);

        env::set_var("SHARED_CONFIG_TEST_VALID", " 42 ");
        assert_eq!(parse_or_default("SHARED_CONFIG_TEST_VALID", 7u64), 42);

        assert_eq!(parse_or_default("SHARED_CONFIG_TEST_MISSING", 3u64), 3);
    }
}
