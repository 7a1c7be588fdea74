#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the `EcoScore` application.
//!
//! Exposes the four core boundary operations — building resolution, roof
//! capacity, solar potential, and score recalculation — as a thin adapter
//! layer. Handlers do parameter marshaling and error-to-status mapping
//! only; all computation lives in the core crates.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use ecoscore_config::Calibration;
use ecoscore_footprint::{overpass::OverpassClient, resolver::BuildingResolver};
use ecoscore_geocoder::{cache::GeocodeCache, chain::ChainGeocoder};
use ecoscore_solar::{estimator::SolarPotentialEstimator, pvgis::PvgisClient};
use ecoscore_store::{HomeStore, MemoryStore};

/// Shared application state.
pub struct AppState {
    /// Building resolver over the geocoding and footprint collaborators.
    pub resolver: BuildingResolver,
    /// Solar potential estimator over the irradiance collaborator.
    pub solar: SolarPotentialEstimator,
    /// Persistent store for homes, improvements, and score history.
    pub store: Arc<dyn HomeStore>,
    /// Calibrated tunables.
    pub calibration: Calibration,
}

impl AppState {
    /// Builds application state over the public provider endpoints and an
    /// in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the calibration override file is malformed or an HTTP
    /// client fails to build — both are startup failures with nothing to
    /// serve.
    #[must_use]
    pub fn with_public_providers() -> Self {
        let calibration = Calibration::from_env().expect("Failed to load calibration");

        let geocoder = ChainGeocoder::from_registry(GeocodeCache::default())
            .expect("Failed to build geocoder");
        let footprints = OverpassClient::public().expect("Failed to build footprint client");
        let resolver = BuildingResolver::new(Arc::new(geocoder), Arc::new(footprints));

        let irradiance = PvgisClient::public().expect("Failed to build irradiance client");
        let solar = SolarPotentialEstimator::new(Arc::new(irradiance), calibration.solar);

        Self {
            resolver,
            solar,
            store: Arc::new(MemoryStore::new()),
            calibration,
        }
    }
}

/// Starts the `EcoScore` API server.
///
/// Bind address and port come from `BIND_ADDR` / `PORT` (defaults
/// `127.0.0.1:8080`). This is a regular async function — the caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route(
                        "/buildings/resolve",
                        web::get().to(handlers::resolve_building),
                    )
                    .route("/roof/capacity", web::get().to(handlers::roof_capacity))
                    .route("/solar/potential", web::get().to(handlers::solar_potential))
                    .route(
                        "/homes/{home_id}/score/recalculate",
                        web::post().to(handlers::recalculate_score),
                    ),
            )
    })
    .bind((bind_addr.as_str(), port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    //! End-to-end scenario over the assembled services with stubbed
    //! collaborators: postcode -> coordinate -> footprint -> score
    //! lifecycle.

    use super::*;
    use chrono::Utc;
    use ecoscore_footprint::projection::EARTH_RADIUS_M;
    use ecoscore_footprint::{FootprintError, FootprintProvider, RawFootprint};
    use ecoscore_geocoder::{
        GeocodeError, GeocodedPostcode, GeocodingProvider, PostcodeGeocoder,
    };
    use ecoscore_home_models::{Coordinate, HomeRecord, Improvement, ImprovementCategory,
        ScoreReason};
    use ecoscore_score::{RecalcOutcome, ScoreTrigger, recalculate};
    use uuid::Uuid;

    struct ScriptedGeocoder;

    #[async_trait::async_trait]
    impl PostcodeGeocoder for ScriptedGeocoder {
        async fn geocode(
            &self,
            postcode: &str,
        ) -> Result<Option<GeocodedPostcode>, GeocodeError> {
            if postcode == "TV1 2AB" {
                Ok(Some(GeocodedPostcode {
                    coordinate: Coordinate::new(51.5074, -0.1278),
                    matched_postcode: Some("TV1 2AB".to_string()),
                    provider: GeocodingProvider::PostcodesIo,
                }))
            } else {
                Ok(None)
            }
        }
    }

    struct ScriptedFootprints;

    #[async_trait::async_trait]
    impl FootprintProvider for ScriptedFootprints {
        async fn nearby_footprints(
            &self,
            center: Coordinate,
            _radius_m: f64,
        ) -> Result<Vec<RawFootprint>, FootprintError> {
            // One ~120 m² square building at the query coordinate.
            let half = 120.0_f64.sqrt() / 2.0;
            let dlat = (half / EARTH_RADIUS_M).to_degrees();
            let dlon =
                (half / (EARTH_RADIUS_M * center.latitude.to_radians().cos())).to_degrees();
            Ok(vec![RawFootprint {
                ring: vec![
                    Coordinate::new(center.latitude - dlat, center.longitude - dlon),
                    Coordinate::new(center.latitude - dlat, center.longitude + dlon),
                    Coordinate::new(center.latitude + dlat, center.longitude + dlon),
                    Coordinate::new(center.latitude + dlat, center.longitude - dlon),
                ],
                building_tag: Some("house".to_string()),
            }])
        }
    }

    #[tokio::test]
    async fn postcode_to_recalculated_score() {
        let calibration = Calibration::embedded_default();
        let resolver =
            BuildingResolver::new(Arc::new(ScriptedGeocoder), Arc::new(ScriptedFootprints));
        let store = MemoryStore::new();

        // Geocode the claimed home's postcode.
        let coordinate = resolver.resolve_postcode("tv1 2ab").await.unwrap();
        assert!((coordinate.latitude - 51.5074).abs() < 1e-9);
        assert!((coordinate.longitude - -0.1278).abs() < 1e-9);

        // Resolve its footprint.
        let footprint = resolver.resolve(coordinate, Some(120.0)).await.unwrap();
        assert!(
            (footprint.area_m2 - 120.0).abs() / 120.0 < 0.01,
            "expected ~120 m², got {}",
            footprint.area_m2
        );

        // Claim the home at baseline efficiency 62.
        let home_id = Uuid::new_v4();
        store
            .insert_home(HomeRecord {
                id: home_id,
                address: "1 Example Street".to_string(),
                postcode: "TV1 2AB".to_string(),
                coordinate: Some(coordinate),
                total_floor_area_m2: Some(120.0),
                baseline_efficiency: Some(62),
                current_score: 62,
                score_updated_at: Utc::now(),
            })
            .await
            .unwrap();

        // No improvements: recalculation is a no-op at 62.
        let outcome = recalculate(
            &store,
            &calibration.score_deltas,
            home_id,
            ScoreTrigger::Manual,
        )
        .await
        .unwrap();
        assert_eq!(outcome, RecalcOutcome::Unchanged { score: 62 });

        // Log a heat pump improvement and recalculate.
        let after = 62 + calibration.score_deltas.heat_pump;
        store
            .insert_improvement(Improvement {
                id: Uuid::new_v4(),
                home_id,
                logged_by: "homeowner".to_string(),
                category: ImprovementCategory::HeatPump,
                cost: 9000.0,
                grant_amount: Some(7500.0),
                estimated_annual_saving: 450.0,
                before_score: 62,
                after_score: after,
                completed_on: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            })
            .await
            .unwrap();

        let outcome = recalculate(
            &store,
            &calibration.score_deltas,
            home_id,
            ScoreTrigger::ImprovementLogged {
                category: ImprovementCategory::HeatPump,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            RecalcOutcome::Updated {
                old_score: 62,
                new_score: after
            }
        );

        let history = store.history_for(home_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, ScoreReason::Recalculation);
        assert_eq!(history[0].detail.as_ref().unwrap()["old_score"], 62);
    }

    #[tokio::test]
    async fn unknown_postcode_is_not_found() {
        let resolver =
            BuildingResolver::new(Arc::new(ScriptedGeocoder), Arc::new(ScriptedFootprints));
        let err = resolver.resolve_postcode("ZZ9 9ZZ").await.unwrap_err();
        assert!(matches!(err, FootprintError::GeocodeNotFound { .. }));
    }
}
