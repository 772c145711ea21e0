//! HTTP transport for registry requests.
//!
//! [`Transport`] is the seam between the version-negotiating facade and the
//! network. [`HttpTransport`] is the reqwest-backed implementation; tests and
//! embedding applications can supply their own.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// Issues GET requests against one registry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs `GET <base url><path>?<query>` and returns the body text.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for a 404, [`RegistryError::ConnectionFailed`]
    /// for network and TLS failures, and another variant for anything else.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String>;
}

/// Connection state derived from a [`RegistryConfig`].
///
/// Immutable once built and shared by every request of its transport.
#[derive(Debug)]
pub struct RegistryHandle {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryHandle {
    /// Builds the HTTP client with proper configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, a header or the client itself is invalid.
    pub fn connect(config: &RegistryConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers(config)?)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|source| RegistryError::Client { source })?;

        tracing::debug!(url = %base_url, verify_ssl = config.verify_ssl, "Registry connection ready");

        Ok(Self { http, base_url })
    }

    /// Returns the base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn default_headers(config: &RegistryConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        for (name, value) in config.connection_headers() {
            let invalid = || RegistryError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(&value).map_err(|_| invalid())?;
            headers.insert(header_name, header_value);
        }

        if let Some(ref user) = config.user {
            let password = config.password.as_deref().unwrap_or_default();
            let credentials = base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                format!("{user}:{password}"),
            );
            let mut value = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
                RegistryError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

/// [`Transport`] over HTTP(S) using reqwest.
///
/// The [`RegistryHandle`] is built on the first request, not at construction,
/// so creating a transport never fails. Concurrent first requests race safely:
/// exactly one handle is published and all of them use it.
#[derive(Debug)]
pub struct HttpTransport {
    config: RegistryConfig,
    handle: OnceCell<RegistryHandle>,
}

impl HttpTransport {
    /// Creates a transport for the given configuration.
    #[must_use]
    pub const fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
        }
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the connection handle, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle cannot be built. A failed build is not
    /// cached; the next call tries again.
    pub fn handle(&self) -> Result<&RegistryHandle> {
        self.handle
            .get_or_try_init(|| RegistryHandle::connect(&self.config))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let handle = self.handle()?;
        let url = format!("{}{path}", handle.base_url);

        tracing::debug!(path, ?query, "GET");

        let response = handle.http.get(&url).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                path: path.to_string(),
            });
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(RegistryError::HttpError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }
}
