//! HTTP handler functions for the `EcoScore` API.
//!
//! Each handler marshals parameters, invokes the corresponding core
//! operation, and maps its error taxonomy to a status code: validation
//! errors to 400, not-found signals to 404, unreachable collaborators to
//! retryable 5xx, and store invariant violations (unreachable by
//! construction) to 500 after being logged.

use actix_web::{HttpResponse, web};
use ecoscore_footprint::FootprintError;
use ecoscore_geocoder::GeocodeError;
use ecoscore_home_models::{Coordinate, PropertyType};
use ecoscore_score::{RecalcOutcome, ScoreError, ScoreTrigger, recalculate};
use ecoscore_server_models::{
    ApiBuildingFootprint, ApiError, ApiHealth, ApiRecalcOutcome, ApiRoofCapacity,
    ApiSolarPotential, RecalculateRequest, ResolveBuildingParams, RoofCapacityParams,
    SolarPotentialParams,
};
use ecoscore_solar::{SolarError, roof::estimate_roof_capacity};
use ecoscore_store::StoreError;
use uuid::Uuid;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/buildings/resolve`
///
/// Resolves a building footprint from a postcode or a coordinate.
pub async fn resolve_building(
    state: web::Data<AppState>,
    params: web::Query<ResolveBuildingParams>,
) -> HttpResponse {
    let coordinate = match (&params.postcode, params.lat, params.lon) {
        (_, Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        (Some(postcode), _, _) => match state.resolver.resolve_postcode(postcode).await {
            Ok(coordinate) => coordinate,
            Err(e) => return footprint_error_response(&e),
        },
        _ => {
            return bad_request("Either postcode or lat and lon must be provided");
        }
    };

    match state.resolver.resolve(coordinate, params.floor_area_m2).await {
        Ok(footprint) => HttpResponse::Ok().json(ApiBuildingFootprint::from(footprint)),
        Err(e) => footprint_error_response(&e),
    }
}

/// `GET /api/roof/capacity`
///
/// Estimates usable rooftop area from floor area, floors, and property
/// type. Unrecognized property types fall back to the conservative
/// default rather than failing.
pub async fn roof_capacity(
    state: web::Data<AppState>,
    params: web::Query<RoofCapacityParams>,
) -> HttpResponse {
    let property_type = params
        .property_type
        .as_deref()
        .map_or(PropertyType::Other, parse_property_type);

    match estimate_roof_capacity(
        params.floor_area_m2,
        params.floors.unwrap_or(1),
        property_type,
        &state.calibration.roof_fractions,
    ) {
        Ok(estimate) => HttpResponse::Ok().json(ApiRoofCapacity::from(estimate)),
        Err(e) => solar_error_response(&e),
    }
}

/// `GET /api/solar/potential`
///
/// Estimates rooftop solar generation potential at a coordinate.
pub async fn solar_potential(
    state: web::Data<AppState>,
    params: web::Query<SolarPotentialParams>,
) -> HttpResponse {
    let location = Coordinate::new(params.lat, params.lon);

    match state
        .solar
        .estimate(location, params.roof_area_m2, params.peak_power_kwp)
        .await
    {
        Ok(result) => HttpResponse::Ok().json(ApiSolarPotential::from(result)),
        Err(e) => solar_error_response(&e),
    }
}

/// `POST /api/homes/{home_id}/score/recalculate`
///
/// Recomputes a home's score; appends a history entry and persists the
/// score only when it changed.
pub async fn recalculate_score(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: Option<web::Json<RecalculateRequest>>,
) -> HttpResponse {
    let home_id = path.into_inner();
    let trigger = match body
        .map(web::Json::into_inner)
        .unwrap_or_default()
        .trigger
        .as_deref()
    {
        Some("scheduled") => ScoreTrigger::Scheduled,
        _ => ScoreTrigger::Manual,
    };

    match recalculate(
        state.store.as_ref(),
        &state.calibration.score_deltas,
        home_id,
        trigger,
    )
    .await
    {
        Ok(RecalcOutcome::Unchanged { score }) => HttpResponse::Ok().json(ApiRecalcOutcome {
            changed: false,
            old_score: None,
            score,
        }),
        Ok(RecalcOutcome::Updated {
            old_score,
            new_score,
        }) => HttpResponse::Ok().json(ApiRecalcOutcome {
            changed: true,
            old_score: Some(old_score),
            score: new_score,
        }),
        Err(e) => score_error_response(&e),
    }
}

/// Parses a property type name case-insensitively; unrecognized values
/// map to [`PropertyType::Other`].
fn parse_property_type(raw: &str) -> PropertyType {
    raw.trim()
        .to_uppercase()
        .replace(['-', ' '], "_")
        .parse()
        .unwrap_or(PropertyType::Other)
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError {
        error: message.to_string(),
    })
}

fn footprint_error_response(error: &FootprintError) -> HttpResponse {
    match error {
        FootprintError::Validation { message } => bad_request(message),
        FootprintError::GeocodeNotFound { .. } | FootprintError::NoBuildingFound { .. } => {
            HttpResponse::NotFound().json(ApiError {
                error: error.to_string(),
            })
        }
        FootprintError::Geocode(GeocodeError::Parse { .. }) | FootprintError::Parse { .. } => {
            log::error!("Footprint collaborator misbehaved: {error}");
            HttpResponse::BadGateway().json(ApiError {
                error: "Upstream provider returned an unusable response".to_string(),
            })
        }
        FootprintError::Geocode(_) | FootprintError::Http(_) => {
            log::warn!("Footprint collaborator unreachable: {error}");
            HttpResponse::ServiceUnavailable().json(ApiError {
                error: "Upstream provider unavailable".to_string(),
            })
        }
    }
}

fn solar_error_response(error: &SolarError) -> HttpResponse {
    match error {
        SolarError::Validation { message } => bad_request(message),
        SolarError::Upstream { .. } => {
            log::error!("Irradiance collaborator misbehaved: {error}");
            HttpResponse::BadGateway().json(ApiError {
                error: "Upstream provider returned an unusable response".to_string(),
            })
        }
        SolarError::Http(_) => {
            log::warn!("Irradiance collaborator unreachable: {error}");
            HttpResponse::ServiceUnavailable().json(ApiError {
                error: "Upstream provider unavailable".to_string(),
            })
        }
    }
}

fn score_error_response(error: &ScoreError) -> HttpResponse {
    match error {
        ScoreError::Validation { message } => bad_request(message),
        ScoreError::HomeNotFound { .. } => HttpResponse::NotFound().json(ApiError {
            error: error.to_string(),
        }),
        ScoreError::Store(StoreError::Invariant { message }) => {
            log::error!("Store invariant violated: {message}");
            HttpResponse::InternalServerError().json(ApiError {
                error: "Internal error".to_string(),
            })
        }
        ScoreError::Store(_) => {
            log::error!("Store operation failed: {error}");
            HttpResponse::InternalServerError().json(ApiError {
                error: "Internal error".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_property_type_names_loosely() {
        assert_eq!(parse_property_type("detached"), PropertyType::Detached);
        assert_eq!(
            parse_property_type("semi-detached"),
            PropertyType::SemiDetached
        );
        assert_eq!(parse_property_type(" Terraced "), PropertyType::Terraced);
        assert_eq!(parse_property_type("castle"), PropertyType::Other);
    }
}
