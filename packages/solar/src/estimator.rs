//! Solar potential estimation from roof area and irradiance.

use std::sync::Arc;

use ecoscore_config::SolarTunables;
use ecoscore_home_models::{Coordinate, SolarAssumptions, SolarPotentialResult};
use log::debug;

use crate::{IrradianceProvider, SolarError};

/// Estimates annual generation, savings, CO₂ avoided, and payback for a
/// rooftop installation at a location.
pub struct SolarPotentialEstimator {
    irradiance: Arc<dyn IrradianceProvider>,
    tunables: SolarTunables,
}

impl SolarPotentialEstimator {
    /// Creates an estimator over an irradiance collaborator and the
    /// configured assumptions.
    #[must_use]
    pub const fn new(irradiance: Arc<dyn IrradianceProvider>, tunables: SolarTunables) -> Self {
        Self {
            irradiance,
            tunables,
        }
    }

    /// Estimates solar potential for `roof_area_m2` of usable roof.
    ///
    /// When `declared_peak_kwp` is not supplied, installed capacity is
    /// derived from the roof area at the configured panel density. A
    /// declared capacity is capped at the same density so an installation
    /// never implies more panel area than the roof provides.
    ///
    /// Outputs are rounded to stable precision (kWp 2 dp, kWh 1 dp,
    /// currency 2 dp, kg 1 dp, years 1 dp), so repeated calls with
    /// identical inputs are byte-identical. Payback is `None` when annual
    /// savings are zero.
    ///
    /// # Errors
    ///
    /// Returns [`SolarError::Validation`] for non-positive roof area,
    /// non-positive declared capacity, or out-of-range coordinates, and
    /// [`SolarError::Upstream`]/[`SolarError::Http`] when the irradiance
    /// collaborator cannot be reached.
    pub async fn estimate(
        &self,
        location: Coordinate,
        roof_area_m2: f64,
        declared_peak_kwp: Option<f64>,
    ) -> Result<SolarPotentialResult, SolarError> {
        if !location.is_valid() {
            return Err(SolarError::Validation {
                message: format!(
                    "Coordinate out of range: ({}, {})",
                    location.latitude, location.longitude
                ),
            });
        }
        if !roof_area_m2.is_finite() || roof_area_m2 <= 0.0 {
            return Err(SolarError::Validation {
                message: format!("Roof area must be positive, got {roof_area_m2}"),
            });
        }
        if let Some(peak) = declared_peak_kwp {
            if !peak.is_finite() || peak <= 0.0 {
                return Err(SolarError::Validation {
                    message: format!("Peak power must be positive, got {peak}"),
                });
            }
        }

        let capacity_cap_kwp = roof_area_m2 * self.tunables.panel_density_kwp_per_m2;
        let peak_power_kwp =
            declared_peak_kwp.map_or(capacity_cap_kwp, |peak| peak.min(capacity_cap_kwp));

        let irradiance_kwh_per_kwp = self.irradiance.annual_yield_kwh_per_kwp(location).await?;
        debug!(
            "Irradiance at ({}, {}): {irradiance_kwh_per_kwp} kWh/kWp/yr",
            location.latitude, location.longitude
        );

        let annual_generation_kwh =
            peak_power_kwp * irradiance_kwh_per_kwp * self.tunables.system_efficiency;
        let annual_saving = annual_generation_kwh * self.tunables.unit_price_per_kwh;
        let co2_avoided_kg = annual_generation_kwh * self.tunables.co2_factor_kg_per_kwh;

        let install_cost = self
            .tunables
            .install_cost_per_kwp
            .mul_add(peak_power_kwp, self.tunables.install_cost_base);
        let payback_years = (annual_saving > 0.0).then(|| round_to(install_cost / annual_saving, 1));

        Ok(SolarPotentialResult {
            peak_power_kwp: round_to(peak_power_kwp, 2),
            annual_generation_kwh: round_to(annual_generation_kwh, 1),
            annual_saving: round_to(annual_saving, 2),
            co2_avoided_kg: round_to(co2_avoided_kg, 1),
            payback_years,
            assumptions: SolarAssumptions {
                irradiance_kwh_per_kwp,
                system_efficiency: self.tunables.system_efficiency,
                unit_price_per_kwh: self.tunables.unit_price_per_kwh,
                panel_density_kwp_per_m2: self.tunables.panel_density_kwp_per_m2,
                install_cost_base: self.tunables.install_cost_base,
                install_cost_per_kwp: self.tunables.install_cost_per_kwp,
                co2_factor_kg_per_kwh: self.tunables.co2_factor_kg_per_kwh,
            },
        })
    }
}

/// Rounds to `decimals` decimal places.
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}
