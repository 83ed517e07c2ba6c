//! Client configuration.

use std::time::Duration;

use crate::error::{ChatflowError, ChatflowResult};

/// Default backend prefix.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/v1";
/// Request deadline and stream inactivity window.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

pub const ENV_API_URL: &str = "CHATFLOW_API_URL";
pub const ENV_API_KEY: &str = "CHATFLOW_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "CHATFLOW_TIMEOUT_SECS";
pub const ENV_USER: &str = "CHATFLOW_USER";

/// Configuration for [`ChatflowClient`](crate::client::ChatflowClient).
///
/// Use the builder methods to customize it.
///
/// # Example
///
/// ```
/// use chatflow_client::config::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://chat.example.com/v1")
///     .with_api_key("app-123")
///     .with_timeout(Duration::from_secs(60));
/// assert_eq!(config.url_for("parameters"), "https://chat.example.com/v1/parameters");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Prefix every request path is appended to (no trailing slash).
    pub base_url: String,
    /// Sent as `Authorization: Bearer <key>` when set.
    pub api_key: Option<String>,
    /// Request deadline for plain calls, inactivity window for streams.
    pub timeout: Duration,
    /// End-user identifier the backend scopes conversations by.
    pub user: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user: "chatflow-cli".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL. A trailing `/` is removed.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Build from `CHATFLOW_*` environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> ChatflowResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> ChatflowResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = present(ENV_API_URL) {
            config = config.with_base_url(url);
        }
        if let Some(key) = present(ENV_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(raw) = present(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ChatflowError::InvalidConfig(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user) = present(ENV_USER) {
            config = config.with_user(user);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no request could succeed with.
    pub fn validate(&self) -> ChatflowResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatflowError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ChatflowError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Join `path` onto the base URL; a leading `/` is optional.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
