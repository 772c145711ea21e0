//! # Dockside Registry
//!
//! Read-only client for Docker registries that speak the v1 API, the v2 API,
//! or both.
//!
//! Callers search repositories, list a registry's catalog, list tags and
//! check liveness through one interface. Each operation tries its preferred
//! protocol, falls back to the other one when the registry does not support
//! it, and normalizes the answer so it looks the same either way.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dockside_registry::{RegistryApi, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = RegistryApi::new(
//!         RegistryConfig::new("https://registry.example.com").with_verify_ssl(false),
//!     );
//!
//!     if api.ok().await {
//!         for tag in api.tags("library/nginx", Some("1.2")).await? {
//!             println!("{}", tag.name);
//!         }
//!     }
//!
//!     // Shared client for the public index
//!     let hub = dockside_registry::docker_hub();
//!     let found = hub.search("nginx").await?;
//!     println!("{found:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RegistryApi                            │
//! │   search ──► v1 search  ──(any failure)──► v2 catalog       │
//! │   tags   ──► v1 tags    ──(any failure)──► v2 tags/list     │
//! │   ok     ──► v1 ping    ──(any failure)──► v2 ping          │
//! │   ┌──────────────────┐  ┌──────────────┐                    │
//! │   │ RegistryResponse │  │ PrefixFilter │                    │
//! │   └──────────────────┘  └──────────────┘                    │
//! └─────────────────────────────────────────────────────────────┘
//!                          │ Transport
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          HttpTransport (reqwest, lazy RegistryHandle)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod config;
mod error;
mod filter;
mod response;
mod transport;

pub use api::{docker_hub, RegistryApi, V1_PING_MARKER};
pub use config::{RegistryConfig, DEFAULT_HEADERS, DEFAULT_URL, DOCKER_HUB_URL};
pub use error::{RegistryError, Result};
pub use filter::PrefixFilter;
pub use response::{RegistryResponse, Repository, SearchResponse, SearchResult, TagEntry};
pub use transport::{HttpTransport, RegistryHandle, Transport};
