//! Version-negotiating registry facade.
//!
//! Registries in the wild speak the v1 API, the v2 API, or a bit of both.
//! Every operation here tries its preferred endpoint first and, if that
//! attempt fails in any way, retries once through the other protocol. The
//! answer is reshaped so callers never see which protocol produced it.
//!
//! | Operation   | Primary                          | Fallback                     |
//! |-------------|----------------------------------|------------------------------|
//! | `search`    | `GET /v1/search?q=`              | `catalog` (v2)               |
//! | `catalog`   | `GET /v2/_catalog`               | none                         |
//! | `tags`      | `GET /v1/repositories/<n>/tags`  | `GET /v2/<n>/tags/list`      |
//! | `ok`        | `GET /v1/`                       | `GET /v2/`                   |

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::filter::PrefixFilter;
use crate::response::{
    CatalogList, RegistryResponse, Repository, SearchResponse, SearchResult, TagEntry, TagList,
};
use crate::transport::{HttpTransport, Transport};

const V1_ROOT: &str = "/v1/";
const V1_SEARCH: &str = "/v1/search";
const V2_ROOT: &str = "/v2/";
const V2_CATALOG: &str = "/v2/_catalog";

/// Text a v1 registry puts in its root response.
pub const V1_PING_MARKER: &str = "Docker Registry API";

static DOCKER_HUB: OnceCell<RegistryApi> = OnceCell::new();

/// Returns the shared client for the public Docker Hub index.
///
/// Created on first call and reused for the lifetime of the process. The
/// instance is read-only; its connection is built lazily on first request.
///
/// # Examples
///
/// ```
/// let hub = dockside_registry::docker_hub();
/// assert!(std::ptr::eq(hub, dockside_registry::docker_hub()));
/// ```
pub fn docker_hub() -> &'static RegistryApi {
    DOCKER_HUB.get_or_init(|| RegistryApi::new(RegistryConfig::docker_hub()))
}

/// Client for one registry endpoint, independent of its API version.
#[derive(Debug)]
pub struct RegistryApi<T = HttpTransport> {
    transport: T,
}

impl RegistryApi<HttpTransport> {
    /// Creates a client talking HTTP to the configured registry.
    ///
    /// Never fails: the connection is built on the first request.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dockside_registry::{RegistryApi, RegistryConfig};
    ///
    /// # async fn run() -> Result<(), dockside_registry::RegistryError> {
    /// let api = RegistryApi::new(
    ///     RegistryConfig::new("https://registry.example.com").with_credentials("ci", "secret"),
    /// );
    /// let tags = api.tags("library/nginx", Some("1.")).await?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub const fn new(config: RegistryConfig) -> Self {
        Self::with_transport(HttpTransport::new(config))
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        self.transport.config()
    }
}

impl Default for RegistryApi<HttpTransport> {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl<T: Transport> RegistryApi<T> {
    /// Creates a client on top of any transport.
    #[must_use]
    pub const fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Searches repositories.
    ///
    /// Uses the v1 search endpoint. If that fails for any reason the v2
    /// catalog is filtered by `query` instead (see [`Self::catalog`]). Any
    /// answer from v1 is kept: JSON without a result list comes back as
    /// [`SearchResponse::Json`] and a body that is not JSON as
    /// [`SearchResponse::Raw`].
    ///
    /// # Errors
    ///
    /// Only fails if v1 is unreachable and the v2 catalog fallback fails.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        match self.search_v1(query).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(error = %e, "API v1 - Search failed, using v2 catalog");
                let results = self.catalog(query).await?;
                Ok(SearchResponse::Results(SearchResult { results }))
            }
        }
    }

    /// Lists repositories of the v2 catalog whose name starts with `query`.
    ///
    /// `query` is a regular expression anchored at the start of the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is not a valid pattern, the catalog
    /// endpoint is unavailable, or its body has no `repositories` list.
    #[instrument(skip(self), level = "debug")]
    pub async fn catalog(&self, query: &str) -> Result<Vec<Repository>> {
        let filter = PrefixFilter::new(query)?;
        let list: CatalogList = decode(V2_CATALOG, self.get(V2_CATALOG, &[]).await?)?;

        Ok(filter
            .retain(list.repositories, String::as_str)
            .into_iter()
            .map(Repository::new)
            .collect())
    }

    /// Lists the tags of `image`, optionally keeping only those starting with `query`.
    ///
    /// Tries the v1 repository tags endpoint, then the v2 tag list. A v2
    /// "not found" means the repository does not exist and yields an empty
    /// list. The filter applies the same way whichever protocol answered.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is not a valid pattern, or if the v2
    /// fallback fails with anything other than "not found".
    #[instrument(skip(self), level = "debug")]
    pub async fn tags(&self, image: &str, query: Option<&str>) -> Result<Vec<TagEntry>> {
        let filter = query.map(PrefixFilter::new).transpose()?;

        let tags = match self.tags_v1(image).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(image, error = %e, "API v1 - Repository tags request failed, using v2");
                self.tags_v2(image).await?
            }
        };

        Ok(match filter {
            Some(filter) => filter.retain(tags, |tag| tag.name.as_str()),
            None => tags,
        })
    }

    /// Checks whether the registry is alive.
    ///
    /// True if the text at `/v1/` mentions [`V1_PING_MARKER`], or, when
    /// `/v1/` fails or answers with a JSON object or array, if `/v2/` answers
    /// with a JSON object. Failures are logged, not returned.
    #[instrument(skip(self), level = "debug")]
    pub async fn ok(&self) -> bool {
        match self.ping_v1().await {
            Ok(text) => text.contains(V1_PING_MARKER),
            Err(e) => {
                warn!(error = %e, "API v1 - Ping failed, trying v2");
                match self.get(V2_ROOT, &[]).await {
                    Ok(RegistryResponse::Object(_)) => true,
                    Ok(other) => {
                        warn!(kind = other.kind(), "API v2 - Ping returned no JSON object");
                        false
                    }
                    Err(e) => {
                        warn!(error = %e, "API v2 - Ping failed");
                        false
                    }
                }
            }
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RegistryResponse> {
        let body = self.transport.get(path, query).await?;
        Ok(RegistryResponse::parse(&body))
    }

    async fn search_v1(&self, query: &str) -> Result<SearchResponse> {
        let value = match self.get(V1_SEARCH, &[("q", query)]).await? {
            RegistryResponse::Unparsed(raw) => return Ok(SearchResponse::Raw(raw)),
            RegistryResponse::Object(map) => Value::Object(map),
            RegistryResponse::Array(items) => Value::Array(items),
            RegistryResponse::Scalar(value) => value,
        };

        if value.is_object() {
            match SearchResult::deserialize(&value) {
                Ok(result) => return Ok(SearchResponse::Results(result)),
                Err(e) => warn!(error = %e, "API v1 - Search body has no result list"),
            }
        }

        Ok(SearchResponse::Json(value))
    }

    async fn ping_v1(&self) -> Result<String> {
        match self.get(V1_ROOT, &[]).await? {
            RegistryResponse::Unparsed(text) | RegistryResponse::Scalar(Value::String(text)) => {
                Ok(text)
            }
            other => Err(RegistryError::UnexpectedResponse {
                path: V1_ROOT.to_string(),
                message: format!("expected text, got {}", other.kind()),
            }),
        }
    }

    async fn tags_v1(&self, image: &str) -> Result<Vec<TagEntry>> {
        let path = format!("/v1/repositories/{image}/tags");

        match self.get(&path, &[]).await? {
            RegistryResponse::Object(map) => {
                Ok(map.into_iter().map(|(tag, _)| TagEntry::new(tag)).collect())
            }
            RegistryResponse::Array(items) => Ok(tag_entries(&path, items)),
            other => Err(RegistryError::UnexpectedResponse {
                message: format!("no tag listing in {} body", other.kind()),
                path,
            }),
        }
    }

    async fn tags_v2(&self, image: &str) -> Result<Vec<TagEntry>> {
        let path = format!("/v2/{image}/tags/list");

        let response = match self.get(&path, &[]).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                debug!(image, "Repository not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let list: TagList = decode(&path, response)?;
        Ok(list
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(TagEntry::new)
            .collect())
    }
}

/// Deserializes an object response into a wire type.
fn decode<D: DeserializeOwned>(path: &str, response: RegistryResponse) -> Result<D> {
    match response {
        RegistryResponse::Object(map) => {
            serde_json::from_value(Value::Object(map)).map_err(|source| RegistryError::Parse {
                path: path.to_string(),
                source,
            })
        }
        other => Err(RegistryError::UnexpectedResponse {
            path: path.to_string(),
            message: format!("expected a JSON object, got {}", other.kind()),
        }),
    }
}

/// Reads tag names out of a v1 list body.
///
/// Accepts plain strings and objects with a `name` (the `[{"layer", "name"}]`
/// shape of old registries). Anything else is skipped.
fn tag_entries(path: &str, items: Vec<Value>) -> Vec<TagEntry> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(TagEntry::new(name)),
            Value::Object(mut entry) => match entry.remove("name") {
                Some(Value::String(name)) => Some(TagEntry::new(name)),
                _ => {
                    warn!(path, "Skipping tag entry without a name");
                    None
                }
            },
            other => {
                warn!(path, entry = %other, "Skipping unrecognized tag entry");
                None
            }
        })
        .collect()
}
