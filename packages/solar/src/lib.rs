#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Roof capacity and rooftop solar potential estimation.
//!
//! Two stages of the physical estimation pipeline:
//!
//! - [`roof`] derives usable rooftop area from floor area, floor count,
//!   and property type using config-calibrated usable fractions.
//! - [`estimator`] converts usable roof area (or a declared installed
//!   capacity) plus a location-specific irradiance factor into annual
//!   generation, savings, CO₂ avoided, and payback.
//!
//! The irradiance factor comes from an external collaborator behind the
//! [`IrradianceProvider`] seam; the PVGIS client in [`pvgis`] is the
//! production implementation.

pub mod estimator;
pub mod pvgis;
pub mod roof;

use ecoscore_home_models::Coordinate;
use thiserror::Error;

/// Errors from roof capacity and solar potential estimation.
#[derive(Debug, Error)]
pub enum SolarError {
    /// Malformed or out-of-range input.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// HTTP request to the irradiance collaborator failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The irradiance collaborator returned an unusable response.
    #[error("Upstream error: {message}")]
    Upstream {
        /// Description of the upstream failure.
        message: String,
    },
}

/// Abstraction over the irradiance collaborator — the seam used by the
/// estimator and by tests.
#[async_trait::async_trait]
pub trait IrradianceProvider: Send + Sync {
    /// Returns the annual yield per installed kWp at the location, in
    /// kWh/kWp/yr, before system losses.
    ///
    /// # Errors
    ///
    /// Returns [`SolarError`] if the collaborator cannot be reached or
    /// its response cannot be parsed.
    async fn annual_yield_kwh_per_kwp(&self, location: Coordinate) -> Result<f64, SolarError>;
}
