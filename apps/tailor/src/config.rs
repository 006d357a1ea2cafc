use std::time::Duration;

use anyhow::{Context, Result};

use crate::pipeline::{PollPolicy, DEFAULT_POLL_INTERVAL};
use crate::service::ApiCredentials;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TEMPLATE: &str = "minimal-pro";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Client configuration loaded from environment variables. Every setting has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub credentials: ApiCredentials,
    pub poll_interval: Duration,
    pub poll_max_attempts: Option<u32>,
    pub request_timeout: Duration,
    pub template: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_interval = match var("TAILOR_POLL_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(parse(&raw, "TAILOR_POLL_INTERVAL_MS")?),
            None => DEFAULT_POLL_INTERVAL,
        };
        if poll_interval.is_zero() {
            anyhow::bail!("TAILOR_POLL_INTERVAL_MS must be greater than zero");
        }

        let poll_max_attempts = var("TAILOR_POLL_MAX_ATTEMPTS")
            .map(|raw| parse::<u32>(&raw, "TAILOR_POLL_MAX_ATTEMPTS"))
            .transpose()?
            .filter(|&n| n > 0);

        let request_timeout = match var("TAILOR_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse(&raw, "TAILOR_REQUEST_TIMEOUT_SECS")?),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Config {
            api_url: var("TAILOR_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            credentials: ApiCredentials::from_token(var("TAILOR_API_TOKEN")),
            poll_interval,
            poll_max_attempts,
            request_timeout,
            template: var("TAILOR_TEMPLATE").unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_attempts: self.poll_max_attempts,
        }
    }
}

fn parse<T>(raw: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn make_config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = make_config(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.credentials, ApiCredentials::Anonymous);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_max_attempts, None);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.template, "minimal-pro");
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = make_config(&[
            ("TAILOR_API_URL", "https://tailor.example.com/api/v1"),
            ("TAILOR_API_TOKEN", "abc123"),
            ("TAILOR_POLL_INTERVAL_MS", "500"),
            ("TAILOR_POLL_MAX_ATTEMPTS", "60"),
            ("TAILOR_TEMPLATE", "tech-focused"),
        ])
        .unwrap();
        assert_eq!(config.credentials, ApiCredentials::Bearer("abc123".to_string()));
        assert_eq!(
            config.poll_policy(),
            PollPolicy {
                interval: Duration::from_millis(500),
                max_attempts: Some(60),
            }
        );
        assert_eq!(config.template, "tech-focused");
        assert!(!format!("{config:?}").contains("abc123"));
    }

    #[test]
    fn test_malformed_number_names_the_variable() {
        let err = make_config(&[("TAILOR_POLL_MAX_ATTEMPTS", "forever")]).unwrap_err();
        assert!(err.to_string().contains("TAILOR_POLL_MAX_ATTEMPTS"));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(make_config(&[("TAILOR_POLL_INTERVAL_MS", "0")]).is_err());
    }

    #[test]
    fn test_zero_attempts_means_unbounded() {
        let config = make_config(&[("TAILOR_POLL_MAX_ATTEMPTS", "0")]).unwrap();
        assert_eq!(config.poll_max_attempts, None);
    }
}
