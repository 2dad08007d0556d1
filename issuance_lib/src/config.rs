//! API connection settings read from the environment.

use std::time::Duration;

use issuance_api::Client;

use crate::error::IssuanceError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "ISSUANCE_API_URL";
pub const ENV_TOKEN: &str = "ISSUANCE_API_TOKEN";
pub const ENV_TIMEOUT: &str = "ISSUANCE_HTTP_TIMEOUT_SECS";

/// Where the API lives and how to authenticate against it.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Reads `ISSUANCE_API_URL`, `ISSUANCE_API_TOKEN` and
    /// `ISSUANCE_HTTP_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let timeout_secs = non_empty(ENV_TIMEOUT)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url: non_empty(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token: non_empty(ENV_TOKEN),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Overrides the base URL when `base_url` is set.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }

    /// Overrides the token when `token` is set.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.token = token;
        }
        self
    }

    /// Builds an API client with the token injected.
    pub fn build_client(&self) -> Result<Client, IssuanceError> {
        let client = Client::with_timeout(&self.base_url, self.timeout)?;
        Ok(match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
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
    fn defaults_when_unset() {
        let cfg = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, ApiConfig::default());
    }

    #[test]
    fn reads_all_keys() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://erp.example.com"),
            (ENV_TOKEN, "tok"),
            (ENV_TIMEOUT, "5"),
        ]));
        assert_eq!(cfg.base_url, "https://erp.example.com");
        assert_eq!(cfg.token.as_deref(), Some("tok"));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_and_blank_token_fall_back() {
        let cfg = ApiConfig::from_lookup(lookup(&[(ENV_TIMEOUT, "soon"), (ENV_TOKEN, "  ")]));
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.token, None);
    }

    #[test]
    fn flags_override_environment() {
        let cfg = ApiConfig::from_lookup(lookup(&[(ENV_TOKEN, "env-token")]))
            .with_base_url(Some("http://127.0.0.1:9000".to_string()))
            .with_token(None);
        assert_eq!(cfg.base_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.token.as_deref(), Some("env-token"));
    }

    #[test]
    fn builds_client_with_token() {
        let cfg = ApiConfig::default().with_token(Some("abc".to_string()));
        let client = cfg.build_client().unwrap();
        assert!(client.has_token());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }
}
