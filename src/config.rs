//! Configuration types for talking to the inpainting service

use crate::error::{InpaintError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public site the client talks to unless told otherwise
pub const DEFAULT_BASE_URL: &str = "https://theinpaint.com";

/// User agent the service has been observed to accept
pub const DEFAULT_USER_AGENT: &str = "Thunder Client (https://www.thunderclient.com)";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration for an [`InpaintClient`](crate::client::InpaintClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the service, e.g. `https://theinpaint.com`
    pub base_url: String,

    /// Value sent in the `User-Agent` header of every request
    pub user_agent: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// - Base URL does not parse or is not http(s)
    /// - Empty user agent
    /// - Zero timeouts
    pub fn validate(&self) -> Result<()> {
        self.site()?;

        if self.user_agent.trim().is_empty() {
            return Err(InpaintError::invalid_config("User agent cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(InpaintError::invalid_config(
                "Request timeout must be at least 1 second",
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(InpaintError::invalid_config(
                "Connect timeout must be at least 1 second",
            ));
        }
        Ok(())
    }

    /// Resolve the base URL into the addresses the endpoints are built from
    pub fn site(&self) -> Result<SiteUrls> {
        SiteUrls::parse(&self.base_url)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the service root
    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the whole-request timeout in seconds
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Set the connect timeout in seconds
    #[must_use]
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating it first
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Addresses derived from the configured base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    root: Url,
    origin: String,
}

impl SiteUrls {
    /// Parse a base URL; the stored root always ends in `/`
    pub fn parse(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(InpaintError::invalid_config("Base URL cannot be empty"));
        }

        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };

        let root = Url::parse(&with_slash).map_err(|e| {
            InpaintError::invalid_config(format!("Invalid base URL '{}': {}", base_url, e))
        })?;

        if !matches!(root.scheme(), "http" | "https") {
            return Err(InpaintError::invalid_config(format!(
                "Unsupported URL scheme '{}' in '{}'. Only http and https are supported",
                root.scheme(),
                base_url
            )));
        }
        if root.host_str().is_none() {
            return Err(InpaintError::invalid_config(format!(
                "Base URL '{}' has no host",
                base_url
            )));
        }

        let origin = root.origin().ascii_serialization();
        Ok(Self { root, origin })
    }

    /// Site root with trailing slash, used as the generic `Referer`
    #[must_use]
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Scheme, host and port without trailing slash, used as `Origin`
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolve a path relative to the site root
    pub fn join(&self, path: &str) -> Result<Url> {
        self.root.join(path.trim_start_matches('/')).map_err(|e| {
            InpaintError::invalid_config(format!(
                "Cannot build URL for '{}' on '{}': {}",
                path, self.root, e
            ))
        })
    }
}
