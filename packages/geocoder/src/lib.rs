#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Postcode geocoding for the `EcoScore` pipeline.
//!
//! Converts postal codes to WGS84 coordinates using a multi-provider
//! strategy configured via TOML files in `services/`:
//!
//! 1. **postcodes.io** (priority 1) — free UK postcode lookup API, no API
//!    key, exact postcode matches.
//! 2. **Nominatim / OpenStreetMap** (priority 2) — fallback structured
//!    search by postal code, 1 req/sec rate limit on the public instance.
//!
//! Providers are loaded from the [`registry`] and executed in priority
//! order by [`chain::ChainGeocoder`], which also consults an explicit,
//! injectable [`cache::GeocodeCache`] so repeated lookups of the same
//! postcode never re-query a provider within the cache TTL.
//!
//! Also provides postcode normalization utilities in [`postcode`].

pub mod cache;
pub mod chain;
pub mod nominatim;
pub mod postcode;
pub mod postcodes_io;
pub mod registry;

use std::time::Duration;

use thiserror::Error;

pub use ecoscore_home_models::Coordinate;

/// Bounded timeout applied to every provider request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A geocoding result with coordinate and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPostcode {
    /// Resolved WGS84 coordinate.
    pub coordinate: Coordinate,
    /// The matched/canonical postcode returned by the provider.
    pub matched_postcode: Option<String>,
    /// Which provider resolved this postcode.
    pub provider: GeocodingProvider,
}

/// Which geocoding provider resolved a postcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// postcodes.io lookup API.
    PostcodesIo,
    /// Nominatim / OpenStreetMap.
    Nominatim,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (timeout, connect failure, or bad status).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Abstraction over postcode geocoding — the seam used by the building
/// resolver and by tests.
#[async_trait::async_trait]
pub trait PostcodeGeocoder: Send + Sync {
    /// Resolves a postcode to a coordinate.
    ///
    /// Returns `Ok(None)` when no provider has a match for the postcode.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the lookup could not be completed
    /// (transport failure, rate limiting, or an unparseable response).
    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError>;
}

/// Builds the shared HTTP client with the bounded default timeout.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the TLS backend fails to initialize.
pub fn default_client() -> Result<reqwest::Client, GeocodeError> {
    Ok(reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()?)
}
