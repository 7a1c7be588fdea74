#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building footprint resolution for the `EcoScore` pipeline.
//!
//! Given a coordinate (or a postcode, resolved through
//! [`ecoscore_geocoder`]), queries a footprint provider for building
//! polygons within a bounded radius, selects the nearest one, and derives
//! geometric attributes: planar area via the shoelace formula on locally
//! projected vertices, centroid, and inferred floor count.
//!
//! Geographic degrees are not uniform distance units, so area is never
//! computed in degree space — vertices are first projected into a local
//! planar frame centered on the polygon's approximate centroid
//! ([`projection`]).

pub mod geometry;
pub mod overpass;
pub mod projection;
pub mod resolver;

use ecoscore_geocoder::GeocodeError;
use ecoscore_home_models::Coordinate;
use thiserror::Error;

/// Default search radius around the query coordinate, in meters.
pub const DEFAULT_RADIUS_M: f64 = 50.0;

/// A raw building polygon as returned by the footprint provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFootprint {
    /// Ordered ring of vertices. May or may not repeat the first vertex.
    pub ring: Vec<Coordinate>,
    /// Provider building-type tag (e.g. `"house"`, `"detached"`), if any.
    pub building_tag: Option<String>,
}

/// Errors from footprint resolution.
#[derive(Debug, Error)]
pub enum FootprintError {
    /// The upstream geocoder failed.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// HTTP request to the footprint provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// No coordinate could be resolved for the postcode.
    #[error("No geocoding match for postcode {postcode}")]
    GeocodeNotFound {
        /// The normalized postcode that missed.
        postcode: String,
    },

    /// No building polygon within the search radius.
    #[error("No building found within {radius_m} m")]
    NoBuildingFound {
        /// The search radius that was used.
        radius_m: f64,
    },

    /// Malformed or out-of-range input.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },
}

/// Abstraction over the footprint provider — the seam used by the
/// resolver and by tests.
#[async_trait::async_trait]
pub trait FootprintProvider: Send + Sync {
    /// Returns building polygons within `radius_m` of `center`.
    ///
    /// An empty vector means no buildings were found; it is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`FootprintError`] if the provider cannot be reached or
    /// its response cannot be parsed.
    async fn nearby_footprints(
        &self,
        center: Coordinate,
        radius_m: f64,
    ) -> Result<Vec<RawFootprint>, FootprintError>;
}
