//! Prefix filtering of repository and tag names.

use regex::Regex;

use crate::error::{RegistryError, Result};

/// Keeps names that match the caller's query anchored at the start.
///
/// The query is used as a regular expression, not as a literal: `"ng.nx"`
/// matches `"nginx"`. Caller input is not escaped, so a query such as `"("`
/// is rejected with [`RegistryError::InvalidQuery`].
#[derive(Debug, Clone)]
pub struct PrefixFilter {
    pattern: Regex,
}

impl PrefixFilter {
    /// Compiles `^query`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidQuery`] if the query is not a valid
    /// regular expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use dockside_registry::PrefixFilter;
    ///
    /// let filter = PrefixFilter::new("nginx")?;
    /// assert!(filter.matches("nginx-alpine"));
    /// assert!(!filter.matches("bitnami/nginx"));
    /// # Ok::<(), dockside_registry::RegistryError>(())
    /// ```
    pub fn new(query: &str) -> Result<Self> {
        let pattern =
            Regex::new(&format!("^{query}")).map_err(|source| RegistryError::InvalidQuery {
                query: query.to_string(),
                source,
            })?;
        Ok(Self { pattern })
    }

    /// Returns true if `name` starts with a match of the query.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Keeps the items whose name matches.
    pub fn retain<T>(&self, items: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.matches(name(item)))
            .collect()
    }
}
