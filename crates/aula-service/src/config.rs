//! Service configuration loaded from environment variables.
//!
//! Both config structs provide a `from_vars` seam so tests can supply a
//! plain map instead of mutating the process environment.

use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP request timeout for remote provider calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout for the HTTP client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of dispatcher workers.
pub const DEFAULT_NOTIFY_WORKERS: usize = 2;

/// Default drain window granted to in-flight jobs at shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Connection settings for the remote conferencing provider.
#[derive(Clone)]
pub struct MeetConfig {
    /// Base URL of the meetings API (e.g. `https://api.meet.example`).
    pub api_base_url: String,

    /// Base URL of the identity endpoint issuing access tokens.
    pub oauth_base_url: String,

    /// Provider account identifier for the credentials grant.
    pub account_id: String,

    /// OAuth client ID.
    pub client_id: String,

    /// OAuth client secret (never logged).
    pub client_secret: SecretString,

    /// Per-request timeout.
    pub http_timeout: Duration,

    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for MeetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeetConfig")
            .field("api_base_url", &self.api_base_url)
            .field("oauth_base_url", &self.oauth_base_url)
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("http_timeout", &self.http_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl MeetConfig {
    /// Create a configuration with default timeouts.
    #[must_use]
    pub fn new(
        api_base_url: String,
        oauth_base_url: String,
        account_id: String,
        client_id: String,
        client_secret: SecretString,
    ) -> Self {
        Self {
            api_base_url,
            oauth_base_url,
            account_id,
            client_id,
            client_secret,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let required = |key: &str| -> Result<String, ConfigError> {
            vars.get(key)
                .cloned()
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        Ok(Self::new(
            required("AULA_MEET_API_BASE_URL")?,
            vars.get("AULA_MEET_OAUTH_BASE_URL")
                .cloned()
                .unwrap_or_else(|| "https://zoom.us".to_string()),
            required("AULA_MEET_ACCOUNT_ID")?,
            required("AULA_MEET_CLIENT_ID")?,
            SecretString::from(required("AULA_MEET_CLIENT_SECRET")?),
        ))
    }
}

/// Sizing and shutdown policy for the notification dispatcher.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Number of worker tasks in the pool.
    pub workers: usize,

    /// How long `shutdown` waits for queued and in-flight jobs before
    /// force-cancelling the workers.
    pub drain_timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_NOTIFY_WORKERS,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

impl NotifierConfig {
    /// Set the drain window (primarily for tests).
    #[must_use]
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Load configuration from a map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = vars.get("AULA_NOTIFY_WORKERS") {
            config.workers = raw.parse().map_err(|_| {
                ConfigError::InvalidValue("AULA_NOTIFY_WORKERS".to_string(), raw.clone())
            })?;
            if config.workers == 0 {
                return Err(ConfigError::InvalidValue(
                    "AULA_NOTIFY_WORKERS".to_string(),
                    "must be at least 1".to_string(),
                ));
            }
        }

        if let Some(raw) = vars.get("AULA_NOTIFY_DRAIN_SECONDS") {
            let secs: u64 = raw.parse().map_err(|_| {
                ConfigError::InvalidValue("AULA_NOTIFY_DRAIN_SECONDS".to_string(), raw.clone())
            })?;
            config.drain_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn meet_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "AULA_MEET_API_BASE_URL".to_string(),
                "https://api.meet.example/v2".to_string(),
            ),
            ("AULA_MEET_ACCOUNT_ID".to_string(), "acct-1".to_string()),
            ("AULA_MEET_CLIENT_ID".to_string(), "client-1".to_string()),
            (
                "AULA_MEET_CLIENT_SECRET".to_string(),
                "super-secret".to_string(),
            ),
        ])
    }

    #[test]
    fn test_meet_config_from_vars() {
        let config = MeetConfig::from_vars(&meet_vars()).expect("config should load");

        assert_eq!(config.api_base_url, "https://api.meet.example/v2");
        assert_eq!(config.oauth_base_url, "https://zoom.us");
        assert_eq!(config.account_id, "acct-1");
        assert_eq!(config.client_id, "client-1");
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn test_meet_config_missing_var() {
        let mut vars = meet_vars();
        vars.remove("AULA_MEET_CLIENT_SECRET");

        let err = MeetConfig::from_vars(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
        assert!(err.to_string().contains("AULA_MEET_CLIENT_SECRET"));
    }

    #[test]
    fn test_meet_config_debug_redacts_secret() {
        let config = MeetConfig::from_vars(&meet_vars()).unwrap();

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn test_notifier_config_defaults() {
        let config = NotifierConfig::default();
        assert_eq!(config.workers, 2);
        assert_eq!(config.drain_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_notifier_config_overrides() {
        let vars = HashMap::from([
            ("AULA_NOTIFY_WORKERS".to_string(), "4".to_string()),
            ("AULA_NOTIFY_DRAIN_SECONDS".to_string(), "5".to_string()),
        ]);

        let config = NotifierConfig::from_vars(&vars).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.drain_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_notifier_config_rejects_zero_workers() {
        let vars = HashMap::from([("AULA_NOTIFY_WORKERS".to_string(), "0".to_string())]);
        assert!(NotifierConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn test_notifier_config_rejects_garbage() {
        let vars = HashMap::from([("AULA_NOTIFY_WORKERS".to_string(), "many".to_string())]);
        assert!(matches!(
            NotifierConfig::from_vars(&vars).unwrap_err(),
            ConfigError::InvalidValue(_, _)
        ));
    }
}
