#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Calibration tunables for the `EcoScore` estimators.
//!
//! Category score deltas, usable-roof fractions, and solar assumptions are
//! configuration to be calibrated, not hard-coded constants. Defaults are
//! embedded at compile time from `calibration.toml`; deployments override
//! them by pointing `ECOSCORE_CALIBRATION` at a TOML file with the same
//! shape.

use ecoscore_home_models::{ImprovementCategory, PropertyType};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a calibration override file.
pub const CALIBRATION_ENV: &str = "ECOSCORE_CALIBRATION";

const DEFAULT_CALIBRATION: &str = include_str!("../calibration.toml");

/// Errors from loading calibration configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the override file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The full calibration set consumed by the score engine, roof capacity
/// estimator, and solar potential estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct Calibration {
    /// Per-category score deltas.
    pub score_deltas: ScoreDeltas,
    /// Per-property-type usable-roof fractions.
    pub roof_fractions: RoofFractions,
    /// Solar estimation assumptions.
    pub solar: SolarTunables,
}

impl Calibration {
    /// Returns the compile-time embedded default calibration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the config is embedded and covered by tests).
    #[must_use]
    pub fn embedded_default() -> Self {
        toml::de::from_str(DEFAULT_CALIBRATION)
            .unwrap_or_else(|e| panic!("Embedded calibration.toml is malformed: {e}"))
    }

    /// Loads calibration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::de::from_str(&raw)?)
    }

    /// Loads calibration from the `ECOSCORE_CALIBRATION` file when set,
    /// falling back to the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override file is set but cannot be
    /// read or parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CALIBRATION_ENV) {
            Ok(path) if !path.is_empty() => Self::load(std::path::Path::new(&path)),
            _ => Ok(Self::embedded_default()),
        }
    }
}

/// Score delta applied per distinct improvement category.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoreDeltas {
    /// Delta for a heat pump installation.
    pub heat_pump: u8,
    /// Delta for loft insulation.
    pub loft_insulation: u8,
    /// Delta for cavity wall insulation.
    pub cavity_wall_insulation: u8,
    /// Delta for a solar PV installation.
    pub solar_pv: u8,
    /// Delta for glazing upgrades.
    pub glazing: u8,
    /// Delta for smart heating controls.
    pub smart_heating_controls: u8,
}

impl ScoreDeltas {
    /// Returns the delta for an improvement category.
    #[must_use]
    pub const fn delta_for(&self, category: ImprovementCategory) -> u8 {
        match category {
            ImprovementCategory::HeatPump => self.heat_pump,
            ImprovementCategory::LoftInsulation => self.loft_insulation,
            ImprovementCategory::CavityWallInsulation => self.cavity_wall_insulation,
            ImprovementCategory::SolarPv => self.solar_pv,
            ImprovementCategory::Glazing => self.glazing,
            ImprovementCategory::SmartHeatingControls => self.smart_heating_controls,
        }
    }
}

/// Usable-roof fraction per property type.
///
/// Detached and bungalow roofs are mostly usable; flats and terraces share
/// or constrain roof access.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RoofFractions {
    /// Fraction for detached houses.
    pub detached: f64,
    /// Fraction for semi-detached houses.
    pub semi_detached: f64,
    /// Fraction for terraced houses.
    pub terraced: f64,
    /// Fraction for flats.
    pub flat: f64,
    /// Fraction for bungalows.
    pub bungalow: f64,
    /// Conservative fraction for unrecognized property types.
    pub other: f64,
}

impl RoofFractions {
    /// Returns the usable fraction for a property type. Never fails;
    /// unrecognized types are already mapped to [`PropertyType::Other`]
    /// upstream.
    #[must_use]
    pub const fn fraction_for(&self, property_type: PropertyType) -> f64 {
        match property_type {
            PropertyType::Detached => self.detached,
            PropertyType::SemiDetached => self.semi_detached,
            PropertyType::Terraced => self.terraced,
            PropertyType::Flat => self.flat,
            PropertyType::Bungalow => self.bungalow,
            PropertyType::Other => self.other,
        }
    }
}

/// Solar estimation assumptions supplied by configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SolarTunables {
    /// kWp of installable capacity per m² of usable roof.
    pub panel_density_kwp_per_m2: f64,
    /// System efficiency (inverter, wiring, shading, orientation losses).
    pub system_efficiency: f64,
    /// Effective electricity unit price, currency per kWh.
    pub unit_price_per_kwh: f64,
    /// Fixed installation cost independent of system size.
    pub install_cost_base: f64,
    /// Installation cost, currency per kWp, on top of the base cost.
    pub install_cost_per_kwp: f64,
    /// Grid carbon intensity, kg CO₂ per kWh.
    pub co2_factor_kg_per_kwh: f64,
}
