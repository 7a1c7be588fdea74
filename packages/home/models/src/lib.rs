#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Home energy domain types and closed taxonomies.
//!
//! This crate defines the canonical property and improvement taxonomies used
//! across the entire `EcoScore` system, plus the record types shared between
//! the score engine, the building resolver, and the solar estimator. All
//! lookup sites match exhaustively on these enums, so adding a category is a
//! compile-time-checked change.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A WGS84 geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` when both components are inside their WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// Dwelling classification used for usable-roof fraction lookups.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    /// Fully detached house.
    Detached,
    /// One shared wall.
    SemiDetached,
    /// Mid- or end-terrace house.
    Terraced,
    /// Flat / apartment within a larger block.
    Flat,
    /// Single-storey detached dwelling.
    Bungalow,
    /// Anything that does not fit the other classifications.
    Other,
}

impl PropertyType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Detached,
            Self::SemiDetached,
            Self::Terraced,
            Self::Flat,
            Self::Bungalow,
            Self::Other,
        ]
    }
}

/// Energy-conservation measure categories.
///
/// Closed set: the score engine applies each category's delta at most once
/// per home, regardless of how many improvements of that category exist.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ImprovementCategory {
    /// Air- or ground-source heat pump installation.
    HeatPump,
    /// Loft / roof insulation top-up.
    LoftInsulation,
    /// Cavity wall insulation.
    CavityWallInsulation,
    /// Rooftop solar photovoltaic installation.
    SolarPv,
    /// Double or triple glazing.
    Glazing,
    /// Smart heating controls / thermostatic zoning.
    SmartHeatingControls,
}

impl ImprovementCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::HeatPump,
            Self::LoftInsulation,
            Self::CavityWallInsulation,
            Self::SolarPv,
            Self::Glazing,
            Self::SmartHeatingControls,
        ]
    }
}

/// Why a score history entry was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreReason {
    /// First score recorded when the home was claimed.
    InitialClaim,
    /// Score recorded as part of logging an improvement.
    Improvement {
        /// The improvement category that was logged.
        category: ImprovementCategory,
    },
    /// Score recomputed on request (manual, scheduled, or post-improvement).
    Recalculation,
}

/// A claimed home as read from the persistent store.
///
/// The store owns this record's lifecycle; the core only reads it and
/// derives new score values from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeRecord {
    /// Primary key.
    pub id: Uuid,
    /// Street address.
    pub address: String,
    /// Postal code.
    pub postcode: String,
    /// Geocoded coordinate, when known.
    pub coordinate: Option<Coordinate>,
    /// Declared total internal floor area in m², when known.
    pub total_floor_area_m2: Option<f64>,
    /// Baseline EPC-style efficiency rating, 0-100.
    pub baseline_efficiency: Option<u8>,
    /// Current score, 0-100.
    pub current_score: u8,
    /// When the score was last persisted.
    pub score_updated_at: DateTime<Utc>,
}

/// A logged energy improvement. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    /// Primary key.
    pub id: Uuid,
    /// The home this improvement belongs to.
    pub home_id: Uuid,
    /// Actor (user id or system) that logged the improvement.
    pub logged_by: String,
    /// Improvement category.
    pub category: ImprovementCategory,
    /// Total cost in currency units.
    pub cost: f64,
    /// Grant amount received, if any.
    pub grant_amount: Option<f64>,
    /// Estimated annual saving in currency units.
    pub estimated_annual_saving: f64,
    /// Home score at the time of logging.
    pub before_score: u8,
    /// Score engine output after applying this improvement.
    pub after_score: u8,
    /// Date the work was completed.
    pub completed_on: NaiveDate,
}

/// One entry in a home's append-only score audit log.
///
/// Entries are never updated or deleted, and timestamps are strictly
/// increasing per home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    /// Primary key.
    pub id: Uuid,
    /// The home this entry belongs to.
    pub home_id: Uuid,
    /// Resulting score, 0-100.
    pub score: u8,
    /// Why this entry was written.
    pub reason: ScoreReason,
    /// Structured detail payload (e.g. `{"old_score": 62, "trigger": "manual"}`).
    pub detail: Option<serde_json::Value>,
    /// When this entry was appended.
    pub recorded_at: DateTime<Utc>,
}

/// A resolved building footprint. Transient — recomputed per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingFootprint {
    /// Ordered closed ring of vertices (first vertex repeated last).
    pub ring: Vec<Coordinate>,
    /// Approximate centroid of the ring.
    pub centroid: Coordinate,
    /// Planar area in m², computed on locally projected vertices.
    pub area_m2: f64,
    /// Inferred floor count, at least 1.
    pub floors: u32,
    /// Building-type tag reported by the footprint provider, if any.
    pub building_type: Option<String>,
}

/// Usable rooftop area derived from floor area and property type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofCapacityEstimate {
    /// Usable roof area in m².
    pub usable_area_m2: f64,
    /// The usable fraction that was applied.
    pub usable_fraction: f64,
    /// The property type the fraction was looked up for.
    pub property_type: PropertyType,
}

/// The assumption set behind a [`SolarPotentialResult`].
///
/// Always returned alongside the numeric outputs so callers and tests can
/// reproduce the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarAssumptions {
    /// Annual yield per installed kWp at the location, kWh/kWp/yr.
    pub irradiance_kwh_per_kwp: f64,
    /// System efficiency folding in inverter, wiring, shading and
    /// orientation losses.
    pub system_efficiency: f64,
    /// Effective electricity unit price, currency per kWh.
    pub unit_price_per_kwh: f64,
    /// Panel density, kWp per m² of roof.
    pub panel_density_kwp_per_m2: f64,
    /// Fixed installation cost independent of system size.
    pub install_cost_base: f64,
    /// Installation cost, currency per kWp, on top of the base cost.
    pub install_cost_per_kwp: f64,
    /// Grid carbon intensity, kg CO₂ per kWh displaced.
    pub co2_factor_kg_per_kwh: f64,
}

/// Output of the solar potential estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarPotentialResult {
    /// Installed or derived capacity in kWp.
    pub peak_power_kwp: f64,
    /// Estimated annual generation in kWh.
    pub annual_generation_kwh: f64,
    /// Estimated annual saving in currency units.
    pub annual_saving: f64,
    /// Estimated CO₂ avoided per year in kg.
    pub co2_avoided_kg: f64,
    /// Payback period in years; `None` when savings are zero (unbounded).
    pub payback_years: Option<f64>,
    /// The assumption set used to produce this result.
    pub assumptions: SolarAssumptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improvement_category_round_trips_through_strum() {
        for category in ImprovementCategory::all() {
            let rendered = category.to_string();
            let parsed: ImprovementCategory = rendered.parse().unwrap();
            assert_eq!(parsed, *category);
        }
    }

    #[test]
    fn property_type_parses_screaming_snake_case() {
        let parsed: PropertyType = "SEMI_DETACHED".parse().unwrap();
        assert_eq!(parsed, PropertyType::SemiDetached);
        assert!("CASTLE".parse::<PropertyType>().is_err());
    }

    #[test]
    fn score_reason_serializes_tagged() {
        let reason = ScoreReason::Improvement {
            category: ImprovementCategory::HeatPump,
        };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["type"], "improvement");
        assert_eq!(json["category"], "HEAT_PUMP");

        let recalc = serde_json::to_value(ScoreReason::Recalculation).unwrap();
        assert_eq!(recalc["type"], "recalculation");
    }

    #[test]
    fn coordinate_validity_bounds() {
        assert!(Coordinate::new(51.5074, -0.1278).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
