//! Usable rooftop area estimation.

use ecoscore_config::RoofFractions;
use ecoscore_home_models::{PropertyType, RoofCapacityEstimate};

use crate::SolarError;

/// Estimates usable rooftop area from floor area, floor count, and
/// property type.
///
/// The ground footprint is approximated as `floor_area / max(floors, 1)`,
/// then scaled by the property type's usable fraction (detached and
/// bungalow roofs are mostly usable; flats and terraces share or
/// constrain roof access). The lookup is exhaustive over the closed
/// [`PropertyType`] taxonomy and never fails.
///
/// # Errors
///
/// Returns [`SolarError::Validation`] when `floor_area_m2` is not a
/// positive finite number.
pub fn estimate_roof_capacity(
    floor_area_m2: f64,
    floors: u32,
    property_type: PropertyType,
    fractions: &RoofFractions,
) -> Result<RoofCapacityEstimate, SolarError> {
    if !floor_area_m2.is_finite() || floor_area_m2 <= 0.0 {
        return Err(SolarError::Validation {
            message: format!("Floor area must be positive, got {floor_area_m2}"),
        });
    }

    let footprint_m2 = floor_area_m2 / f64::from(floors.max(1));
    let usable_fraction = fractions.fraction_for(property_type);

    Ok(RoofCapacityEstimate {
        usable_area_m2: footprint_m2 * usable_fraction,
        usable_fraction,
        property_type,
    })
}
