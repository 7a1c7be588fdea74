#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `EcoScore` server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types to allow independent evolution of the API
//! contract; footprint rings are exposed as `GeoJSON` geometry.

use ecoscore_home_models::{
    BuildingFootprint, Coordinate, RoofCapacityEstimate, SolarAssumptions, SolarPotentialResult,
};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable error description.
    pub error: String,
}

/// Query parameters for the building resolution endpoint.
///
/// Either `postcode` or both `lat` and `lon` must be supplied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBuildingParams {
    /// Postcode to geocode, when no coordinate is given.
    pub postcode: Option<String>,
    /// Latitude in decimal degrees.
    pub lat: Option<f64>,
    /// Longitude in decimal degrees.
    pub lon: Option<f64>,
    /// Declared total floor area in m², used to infer the floor count.
    pub floor_area_m2: Option<f64>,
}

/// A resolved building footprint as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBuildingFootprint {
    /// Centroid latitude.
    pub centroid_lat: f64,
    /// Centroid longitude.
    pub centroid_lon: f64,
    /// Planar footprint area in m².
    pub area_m2: f64,
    /// Inferred floor count.
    pub floors: u32,
    /// Provider building-type tag, if any.
    pub building_type: Option<String>,
    /// Footprint ring as a `GeoJSON` Polygon.
    pub geometry: geojson::Geometry,
}

impl From<BuildingFootprint> for ApiBuildingFootprint {
    fn from(footprint: BuildingFootprint) -> Self {
        Self {
            centroid_lat: footprint.centroid.latitude,
            centroid_lon: footprint.centroid.longitude,
            area_m2: footprint.area_m2,
            floors: footprint.floors,
            geometry: ring_geometry(&footprint.ring),
            building_type: footprint.building_type,
        }
    }
}

/// Converts a closed coordinate ring into a `GeoJSON` Polygon geometry.
fn ring_geometry(ring: &[Coordinate]) -> geojson::Geometry {
    let exterior: geo::LineString<f64> = ring
        .iter()
        .map(|c| geo::Coord {
            x: c.longitude,
            y: c.latitude,
        })
        .collect();
    let polygon = geo::Polygon::new(exterior, Vec::new());
    geojson::Geometry::new(geojson::Value::from(&polygon))
}

/// Query parameters for the roof capacity endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofCapacityParams {
    /// Total internal floor area in m².
    pub floor_area_m2: f64,
    /// Number of floors; defaults to 1.
    pub floors: Option<u32>,
    /// Property type name (case-insensitive; unrecognized values fall
    /// back to a conservative default).
    pub property_type: Option<String>,
}

/// Roof capacity estimate as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRoofCapacity {
    /// Usable roof area in m².
    pub usable_area_m2: f64,
    /// The usable fraction that was applied.
    pub usable_fraction: f64,
    /// The property type the fraction was looked up for.
    pub property_type: String,
}

impl From<RoofCapacityEstimate> for ApiRoofCapacity {
    fn from(estimate: RoofCapacityEstimate) -> Self {
        Self {
            usable_area_m2: estimate.usable_area_m2,
            usable_fraction: estimate.usable_fraction,
            property_type: estimate.property_type.to_string(),
        }
    }
}

/// Query parameters for the solar potential endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPotentialParams {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Usable roof area in m².
    pub roof_area_m2: f64,
    /// Declared installed capacity in kWp; derived from roof area when
    /// absent.
    pub peak_power_kwp: Option<f64>,
}

/// Solar potential estimate as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSolarPotential {
    /// Installed or derived capacity in kWp.
    pub peak_power_kwp: f64,
    /// Estimated annual generation in kWh.
    pub annual_generation_kwh: f64,
    /// Estimated annual saving in currency units.
    pub annual_saving: f64,
    /// Estimated CO₂ avoided per year in kg.
    pub co2_avoided_kg: f64,
    /// Payback period in years; absent when savings are zero.
    pub payback_years: Option<f64>,
    /// The assumption set used to produce this result.
    pub assumptions: ApiSolarAssumptions,
}

/// The assumption set echoed with every solar estimate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSolarAssumptions {
    /// Annual yield per installed kWp, kWh/kWp/yr.
    pub irradiance_kwh_per_kwp: f64,
    /// System efficiency applied to the raw yield.
    pub system_efficiency: f64,
    /// Electricity unit price, currency per kWh.
    pub unit_price_per_kwh: f64,
    /// Panel density, kWp per m² of roof.
    pub panel_density_kwp_per_m2: f64,
    /// Fixed installation cost.
    pub install_cost_base: f64,
    /// Installation cost per kWp.
    pub install_cost_per_kwp: f64,
    /// Grid carbon intensity, kg CO₂ per kWh.
    pub co2_factor_kg_per_kwh: f64,
}

impl From<SolarAssumptions> for ApiSolarAssumptions {
    fn from(assumptions: SolarAssumptions) -> Self {
        Self {
            irradiance_kwh_per_kwp: assumptions.irradiance_kwh_per_kwp,
            system_efficiency: assumptions.system_efficiency,
            unit_price_per_kwh: assumptions.unit_price_per_kwh,
            panel_density_kwp_per_m2: assumptions.panel_density_kwp_per_m2,
            install_cost_base: assumptions.install_cost_base,
            install_cost_per_kwp: assumptions.install_cost_per_kwp,
            co2_factor_kg_per_kwh: assumptions.co2_factor_kg_per_kwh,
        }
    }
}

impl From<SolarPotentialResult> for ApiSolarPotential {
    fn from(result: SolarPotentialResult) -> Self {
        Self {
            peak_power_kwp: result.peak_power_kwp,
            annual_generation_kwh: result.annual_generation_kwh,
            annual_saving: result.annual_saving,
            co2_avoided_kg: result.co2_avoided_kg,
            payback_years: result.payback_years,
            assumptions: result.assumptions.into(),
        }
    }
}

/// Request body for the score recalculation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    /// What prompted the recalculation: `"manual"` (default) or
    /// `"scheduled"`.
    pub trigger: Option<String>,
}

/// Recalculation outcome as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecalcOutcome {
    /// Whether the score changed and was persisted.
    pub changed: bool,
    /// The previous score, present only when it changed.
    pub old_score: Option<u8>,
    /// The current score after recalculation.
    pub score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_ring_becomes_geojson_polygon() {
        let footprint = BuildingFootprint {
            ring: vec![
                Coordinate::new(51.5073, -0.1279),
                Coordinate::new(51.5073, -0.1277),
                Coordinate::new(51.5075, -0.1277),
                Coordinate::new(51.5073, -0.1279),
            ],
            centroid: Coordinate::new(51.5074, -0.1278),
            area_m2: 120.0,
            floors: 2,
            building_type: Some("house".to_string()),
        };

        let api: ApiBuildingFootprint = footprint.into();
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["geometry"]["type"], "Polygon");
        assert_eq!(json["areaM2"], 120.0);
        assert_eq!(json["floors"], 2);
        // GeoJSON positions are [lon, lat].
        let first = &json["geometry"]["coordinates"][0][0];
        assert!((first[0].as_f64().unwrap() - -0.1279).abs() < 1e-9);
        assert!((first[1].as_f64().unwrap() - 51.5073).abs() < 1e-9);
    }
}
