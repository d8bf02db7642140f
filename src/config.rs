//! Client configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the pay action's failure modes are allowed to turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFallback {
    /// Only an explicit 404/405 from the pay action leads to a client-processed result.
    /// A network failure falls through to the generic update endpoint.
    #[default]
    Strict,
    /// A network failure from the pay action also leads to a client-processed result.
    Lenient,
}

impl std::str::FromStr for PaymentFallback {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PaymentFallback::Strict),
            "lenient" => Ok(PaymentFallback::Lenient),
            other => Err(ConfigError::InvalidValue {
                key: "BOOKING_PAYMENT_FALLBACK",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend API root, e.g. `http://localhost:5000/api`
    pub api_base_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    pub payment_fallback: PaymentFallback,
    /// Capacity of the order cache request channel
    pub cache_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout_ms: 5000,
            payment_fallback: PaymentFallback::Strict,
            cache_buffer: 32,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `BOOKING_*` environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` when a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            api_base_url: lookup("BOOKING_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            request_timeout_ms: parse_var(&lookup, "BOOKING_API_TIMEOUT_MS")?
                .unwrap_or(defaults.request_timeout_ms),
            payment_fallback: lookup("BOOKING_PAYMENT_FALLBACK")
                .map(|raw| raw.parse::<PaymentFallback>())
                .transpose()?
                .unwrap_or(defaults.payment_fallback),
            cache_buffer: match parse_var::<usize>(&lookup, "BOOKING_CACHE_BUFFER")? {
                Some(0) => {
                    return Err(ConfigError::InvalidValue {
                        key: "BOOKING_CACHE_BUFFER",
                        value: "0".to_string(),
                    })
                }
                Some(size) => size,
                None => defaults.cache_buffer,
            },
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value: raw.clone() })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("BOOKING_API_URL", "https://tickets.example.com/api/"),
            ("BOOKING_API_TIMEOUT_MS", "1500"),
            ("BOOKING_PAYMENT_FALLBACK", "Lenient"),
            ("BOOKING_CACHE_BUFFER", "8"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://tickets.example.com/api");
        assert_eq!(config.request_timeout_ms, 1500);
        assert_eq!(config.payment_fallback, PaymentFallback::Lenient);
        assert_eq!(config.cache_buffer, 8);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = ClientConfig::from_lookup(lookup_from(&[("BOOKING_API_TIMEOUT_MS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "BOOKING_API_TIMEOUT_MS",
                value: "soon".to_string()
            }
        );

        let err = ClientConfig::from_lookup(lookup_from(&[("BOOKING_PAYMENT_FALLBACK", "yolo")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "BOOKING_PAYMENT_FALLBACK", .. }));
    }

    #[test]
    fn test_zero_cache_buffer_is_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[("BOOKING_CACHE_BUFFER", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "BOOKING_CACHE_BUFFER",
                value: "0".to_string()
            }
        );
    }
}
