//! Configuration types for registry client.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RegistryError, Result};

/// URL of the public Docker Hub index.
pub const DOCKER_HUB_URL: &str = "https://index.docker.io/";

/// URL used when no registry is configured.
pub const DEFAULT_URL: &str = "http://localhost:5000";

/// Headers every connection starts with.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json")];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one registry endpoint.
///
/// Built once per [`RegistryApi`](crate::RegistryApi) and never mutated
/// afterwards. Hosts can deserialize it from a plain map holding only
/// `url`, `verify_ssl`, `user` and `password`; everything else has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry URL (e.g., "<https://registry.example.com>").
    pub url: String,

    /// Whether to verify the registry's TLS certificate.
    pub verify_ssl: bool,

    /// Username for basic authentication.
    pub user: Option<String>,

    /// Password for basic authentication.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Headers sent in addition to (or overriding) [`DEFAULT_HEADERS`].
    pub headers: BTreeMap<String, String>,

    /// Drop an explicit `:80`/`:443` from the URL.
    pub omit_default_port: bool,

    /// Request timeout.
    #[serde(skip, default = "default_timeout")]
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

const fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use dockside_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com");
    /// assert_eq!(config.url, "https://registry.example.com");
    /// assert!(config.verify_ssl);
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            verify_ssl: true,
            user: None,
            password: None,
            headers: BTreeMap::new(),
            omit_default_port: true,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("dockside-registry/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Configuration for the public Docker Hub index.
    #[must_use]
    pub fn docker_hub() -> Self {
        Self::new(DOCKER_HUB_URL)
    }

    /// Sets basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use dockside_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com")
    ///     .with_credentials("user", "secret");
    /// assert_eq!(config.user.as_deref(), Some("user"));
    /// ```
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Enables or disables TLS certificate verification.
    #[must_use]
    pub const fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    /// Adds a header to every request, overriding a default of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Controls whether an explicit default port is dropped from the URL.
    #[must_use]
    pub const fn with_omit_default_port(mut self, omit: bool) -> Self {
        self.omit_default_port = omit;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns [`DEFAULT_HEADERS`] merged with the configured headers.
    ///
    /// Header names compare case-insensitively and configured values win.
    ///
    /// # Examples
    ///
    /// ```
    /// use dockside_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com")
    ///     .with_header("content-type", "text/plain")
    ///     .with_header("X-Trace", "1");
    /// let headers = config.connection_headers();
    /// assert_eq!(headers.len(), 2);
    /// assert!(headers.contains(&("content-type".to_string(), "text/plain".to_string())));
    /// ```
    #[must_use]
    pub fn connection_headers(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();

        for (name, value) in &self.headers {
            merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            merged.push((name.clone(), value.clone()));
        }

        merged
    }

    /// Returns the validated base URL without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if the URL does not parse or is
    /// not http(s).
    ///
    /// # Examples
    ///
    /// ```
    /// use dockside_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com:443/");
    /// assert_eq!(config.base_url().unwrap(), "https://registry.example.com");
    /// ```
    pub fn base_url(&self) -> Result<String> {
        let invalid = || RegistryError::InvalidUrl {
            url: self.url.clone(),
        };

        let parsed = Url::parse(&self.url).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid());
        }

        let base = if self.omit_default_port {
            parsed.to_string()
        } else {
            self.url.clone()
        };

        Ok(base.trim_end_matches('/').to_string())
    }
}
