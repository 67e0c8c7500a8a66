use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.flickr.com/services/feeds/photos_public.gne";
pub const DEFAULT_USER_AGENT: &str = "PhotoSearch/0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub user_agent: String,
    /// `None` leaves the HTTP client's own default in place.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    /// Builds the configuration from the defaults plus
    /// `PHOTOSEARCH_ENDPOINT` and `PHOTOSEARCH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var("PHOTOSEARCH_ENDPOINT").ok(),
            std::env::var("PHOTOSEARCH_TIMEOUT_SECS").ok(),
        )
    }

    /// Applies command-line values on top; `None` keeps the current value.
    pub fn with_overrides(mut self, endpoint: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(secs) = timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        self
    }

    fn from_vars(endpoint: Option<String>, timeout_secs: Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(secs) = timeout_secs {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid PHOTOSEARCH_TIMEOUT_SECS: {}", secs))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
