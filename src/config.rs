//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default number of reconciliation attempts (1 initial + 19 retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

const ENV_API_URL: &str = "SIGNUP_RECONCILE_API_URL";
const ENV_TOKEN: &str = "SIGNUP_RECONCILE_TOKEN";
const ENV_MAX_ATTEMPTS: &str = "SIGNUP_RECONCILE_MAX_ATTEMPTS";
const ENV_RETRY_DELAY_MS: &str = "SIGNUP_RECONCILE_RETRY_DELAY_MS";

/// Reconciliation configuration.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Base URL of the account backend, without trailing slash.
    pub api_base_url: String,
    /// Bearer token issued by the identity provider.
    pub api_token: SecretString,
    /// Attempt budget per cycle. Reaching it with only not-found answers is a timeout.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            api_token: SecretString::from(""),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ReconcileConfig {
    /// Build configuration from environment variables.
    ///
    /// Only the token is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_token = lookup(ENV_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_TOKEN.to_string()))?;

        let api_base_url = lookup(ENV_API_URL)
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let max_attempts = match lookup(ENV_MAX_ATTEMPTS) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_MAX_ATTEMPTS.to_string(),
                message: format!("expected a positive integer, got {raw:?}"),
            })?,
            None => defaults.max_attempts,
        };

        let retry_delay = match lookup(ENV_RETRY_DELAY_MS) {
            Some(raw) => Duration::from_millis(raw.parse().map_err(|_| {
                ConfigError::InvalidValue {
                    key: ENV_RETRY_DELAY_MS.to_string(),
                    message: format!("expected milliseconds, got {raw:?}"),
                }
            })?),
            None => defaults.retry_delay,
        };

        let config = Self {
            api_base_url,
            api_token,
            max_attempts,
            retry_delay,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the attempt loop cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_MAX_ATTEMPTS.to_string(),
                message: "attempt budget must be at least 1".to_string(),
            });
        }
        if self.api_base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_API_URL.to_string(),
                message: "base URL must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_attempt_budget() {
        let config = ReconcileConfig::default();
        assert_eq!(config.max_attempts, 20);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
    }

    #[test]
    fn token_is_required() {
        let err = ReconcileConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == ENV_TOKEN));
    }

    #[test]
    fn reads_overrides() {
        let config = ReconcileConfig::from_lookup(lookup_from(&[
            (ENV_TOKEN, "abc"),
            (ENV_API_URL, "https://api.example.com/"),
            (ENV_MAX_ATTEMPTS, "5"),
            (ENV_RETRY_DELAY_MS, "100"),
        ]))
        .unwrap();
        assert_eq!(config.api_token.expose_secret(), "abc");
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(100));
    }

    #[test]
    fn rejects_zero_budget() {
        let err = ReconcileConfig::from_lookup(lookup_from(&[
            (ENV_TOKEN, "abc"),
            (ENV_MAX_ATTEMPTS, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn rejects_garbage_delay() {
        let err = ReconcileConfig::from_lookup(lookup_from(&[
            (ENV_TOKEN, "abc"),
            (ENV_RETRY_DELAY_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_RETRY_DELAY_MS));
    }
}
