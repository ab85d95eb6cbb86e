//! Controller configuration.

use std::time::Duration;

use crate::types::UserId;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Environment variable overriding `ControllerConfig::base_url`.
pub const BASE_URL_ENV: &str = "POSTS_API_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub base_url: String,
    /// Author attached to every created post; there is no signed-in user.
    pub default_user_id: UserId,
    /// Extra attempts for a load that received no response.
    pub load_retries: u32,
    pub retry_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_user_id: 1,
            load_retries: 2,
            retry_delay: Duration::from_millis(250),
        }
    }
}

impl ControllerConfig {
    /// Defaults, with the base URL taken from `POSTS_API_BASE_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_load_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.load_retries = retries;
        self.retry_delay = delay;
        self
    }
}
