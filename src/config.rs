use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Client configuration, loadable from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-fetch timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Listings of one result page fetched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_on_listing_error")]
    pub on_listing_error: OnError,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            concurrency: default_concurrency(),
            on_listing_error: default_on_listing_error(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `SCOUT_*` variables, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_agent) = lookup("SCOUT_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = lookup("SCOUT_TIMEOUT_SECS") {
            config.timeout = timeout
                .trim()
                .parse()
                .with_context(|| format!("SCOUT_TIMEOUT_SECS is not a number: {timeout:?}"))?;
        }
        if let Some(concurrency) = lookup("SCOUT_CONCURRENCY") {
            config.concurrency = concurrency
                .trim()
                .parse()
                .with_context(|| format!("SCOUT_CONCURRENCY is not a number: {concurrency:?}"))?;
        }
        if let Some(policy) = lookup("SCOUT_ON_LISTING_ERROR") {
            config.on_listing_error = policy.parse()?;
        }

        if config.timeout == 0 {
            bail!("SCOUT_TIMEOUT_SECS must be at least 1");
        }
        if config.concurrency == 0 {
            bail!("SCOUT_CONCURRENCY must be at least 1");
        }
        Ok(config)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_user_agent() -> String {
    String::from("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
}

fn default_timeout() -> u64 {
    30
}

fn default_concurrency() -> usize {
    1
}

fn default_on_listing_error() -> OnError {
    OnError::SkipAndLog
}

/// What a crawl does when one discovered listing fails to load or extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnError {
    /// Abort the whole crawl, discarding accumulated listings
    Fail,
    SkipAndLog,
}

impl std::str::FromStr for OnError {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(OnError::Fail),
            "skip" | "skip-and-log" => Ok(OnError::SkipAndLog),
            other => bail!("unknown listing error policy: {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.on_listing_error, OnError::SkipAndLog);
    }

    #[test]
    fn overrides_from_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SCOUT_USER_AGENT", "scout-test"),
            ("SCOUT_TIMEOUT_SECS", "5"),
            ("SCOUT_CONCURRENCY", "4"),
            ("SCOUT_ON_LISTING_ERROR", "fail"),
        ]))
        .unwrap();
        assert_eq!(config.user_agent, "scout-test");
        assert_eq!(config.timeout_duration(), Duration::from_secs(5));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.on_listing_error, OnError::Fail);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_lookup(lookup(&[("SCOUT_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("SCOUT_TIMEOUT_SECS", "0")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("SCOUT_CONCURRENCY", "0")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("SCOUT_ON_LISTING_ERROR", "retry")])).is_err());
    }

    #[test]
    fn deserializes_with_field_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"concurrency": 3}"#).unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout, 30);
    }
}
