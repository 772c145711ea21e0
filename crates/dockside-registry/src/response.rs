//! Registry response shapes.
//!
//! Registries disagree on what a given endpoint returns, so bodies are first
//! classified into a [`RegistryResponse`] and each operation decides what to
//! do with the variant it got. Everything handed back to callers is one of
//! the normalized types below, whichever protocol produced it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A response body classified by its JSON shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryResponse {
    /// A JSON object.
    Object(Map<String, Value>),
    /// A JSON array.
    Array(Vec<Value>),
    /// Any other JSON value (string, number, bool, null).
    Scalar(Value),
    /// The body was not JSON; the raw text is kept.
    Unparsed(String),
}

impl RegistryResponse {
    /// Classifies a raw response body.
    ///
    /// Never fails: a body that is not JSON becomes [`Self::Unparsed`] and a
    /// warning is logged.
    ///
    /// # Examples
    ///
    /// ```
    /// use dockside_registry::RegistryResponse;
    ///
    /// assert!(matches!(RegistryResponse::parse("{}"), RegistryResponse::Object(_)));
    /// assert!(matches!(
    ///     RegistryResponse::parse("Docker Registry API"),
    ///     RegistryResponse::Unparsed(_)
    /// ));
    /// ```
    #[must_use]
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from(value),
            Err(e) => {
                tracing::warn!(error = %e, "JSON parsing failed, keeping raw body");
                Self::Unparsed(body.to_string())
            }
        }
    }

    /// Short name of the variant, used in log fields and error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Scalar(_) => "scalar",
            Self::Unparsed(_) => "unparsed",
        }
    }
}

impl From<Value> for RegistryResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
            other => Self::Scalar(other),
        }
    }
}

/// A single tag of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagEntry {
    /// Tag name.
    pub name: String,
}

impl TagEntry {
    /// Creates a tag entry.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A repository as returned by search or catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name (e.g., "library/nginx").
    pub name: String,

    /// Description, only present on v1 search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Remaining v1 search fields (`star_count`, `is_official`, ...).
    ///
    /// Empty for entries built from the v2 catalog.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Repository {
    /// Creates a repository entry without description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            extra: Map::new(),
        }
    }
}

/// Result of a repository search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matching repositories.
    pub results: Vec<Repository>,
}

/// What [`RegistryApi::search`](crate::RegistryApi::search) hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResponse {
    /// Structured results, from v1 search or v2 catalog filtering.
    Results(SearchResult),
    /// The v1 search endpoint answered with JSON of another shape.
    Json(Value),
    /// The v1 search endpoint answered with something that is not JSON.
    Raw(String),
}

impl SearchResponse {
    /// Returns the structured results, if any.
    #[must_use]
    pub const fn results(&self) -> Option<&SearchResult> {
        match self {
            Self::Results(result) => Some(result),
            Self::Json(_) | Self::Raw(_) => None,
        }
    }
}

/// Body of `GET /v2/_catalog`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogList {
    pub repositories: Vec<String>,
}

/// Body of `GET /v2/<name>/tags/list`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagList {
    /// Registries return `null` for a repository without tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}
