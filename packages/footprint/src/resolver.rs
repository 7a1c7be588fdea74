//! Building resolution: nearest footprint selection and derived attributes.

use std::sync::Arc;

use ecoscore_geocoder::{PostcodeGeocoder, postcode};
use ecoscore_home_models::{BuildingFootprint, Coordinate};
use log::debug;

use crate::{
    DEFAULT_RADIUS_M, FootprintError, FootprintProvider, RawFootprint,
    geometry::ring_area_m2,
    projection::{LocalProjection, approximate_centroid},
};

/// Resolves a coordinate (or postcode) to the nearest building footprint
/// and its derived geometric attributes.
///
/// Resolving the same coordinate against unchanged provider data yields
/// the same footprint and area within floating-point tolerance.
pub struct BuildingResolver {
    geocoder: Arc<dyn PostcodeGeocoder>,
    provider: Arc<dyn FootprintProvider>,
    radius_m: f64,
}

impl BuildingResolver {
    /// Creates a resolver with the default 50 m search radius.
    #[must_use]
    pub fn new(geocoder: Arc<dyn PostcodeGeocoder>, provider: Arc<dyn FootprintProvider>) -> Self {
        Self {
            geocoder,
            provider,
            radius_m: DEFAULT_RADIUS_M,
        }
    }

    /// Overrides the search radius.
    #[must_use]
    pub const fn with_radius(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }

    /// Resolves a postcode to a coordinate via the geocoder collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`FootprintError::GeocodeNotFound`] when no provider has a
    /// match, or [`FootprintError::Geocode`] when the geocoder fails.
    pub async fn resolve_postcode(&self, raw_postcode: &str) -> Result<Coordinate, FootprintError> {
        let normalized = postcode::normalize(raw_postcode);
        match self.geocoder.geocode(&normalized).await? {
            Some(geocoded) => Ok(geocoded.coordinate),
            None => Err(FootprintError::GeocodeNotFound {
                postcode: normalized,
            }),
        }
    }

    /// Resolves the nearest building footprint around a coordinate.
    ///
    /// When `declared_floor_area_m2` is available for the home, the floor
    /// count is derived as `round(total / footprint_area)` floored at 1;
    /// otherwise it defaults to 1.
    ///
    /// # Errors
    ///
    /// Returns [`FootprintError::Validation`] for out-of-range
    /// coordinates, [`FootprintError::NoBuildingFound`] when the provider
    /// returns no usable polygon within the radius, and provider
    /// transport/parse errors as-is.
    pub async fn resolve(
        &self,
        center: Coordinate,
        declared_floor_area_m2: Option<f64>,
    ) -> Result<BuildingFootprint, FootprintError> {
        if !center.is_valid() {
            return Err(FootprintError::Validation {
                message: format!(
                    "Coordinate out of range: ({}, {})",
                    center.latitude, center.longitude
                ),
            });
        }

        let raw = self
            .provider
            .nearby_footprints(center, self.radius_m)
            .await?;

        debug!(
            "Footprint provider returned {} polygon(s) within {} m",
            raw.len(),
            self.radius_m
        );

        let frame = LocalProjection::centered_on(center);
        let nearest = raw
            .into_iter()
            .filter_map(|footprint| candidate(&footprint))
            .min_by(|a, b| {
                let da = frame.distance_from_origin_m(a.centroid);
                let db = frame.distance_from_origin_m(b.centroid);
                da.total_cmp(&db)
            });

        let Some(chosen) = nearest else {
            return Err(FootprintError::NoBuildingFound {
                radius_m: self.radius_m,
            });
        };

        let floors = derive_floor_count(declared_floor_area_m2, chosen.area_m2);

        Ok(BuildingFootprint {
            ring: close_ring(chosen.ring),
            centroid: chosen.centroid,
            area_m2: chosen.area_m2,
            floors,
            building_type: chosen.building_tag,
        })
    }
}

struct Candidate {
    ring: Vec<Coordinate>,
    centroid: Coordinate,
    area_m2: f64,
    building_tag: Option<String>,
}

/// Validates a raw footprint into a candidate, discarding degenerate
/// rings (fewer than 3 distinct vertices, or zero area).
fn candidate(footprint: &RawFootprint) -> Option<Candidate> {
    let area_m2 = ring_area_m2(&footprint.ring)?;
    let centroid = approximate_centroid(&footprint.ring)?;
    Some(Candidate {
        ring: footprint.ring.clone(),
        centroid,
        area_m2,
        building_tag: footprint.building_tag.clone(),
    })
}

/// `round(total / area)` floored at 1, defaulting to 1 without a
/// declared total floor area.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn derive_floor_count(declared_floor_area_m2: Option<f64>, footprint_area_m2: f64) -> u32 {
    declared_floor_area_m2.map_or(1, |total| {
        let ratio = (total / footprint_area_m2).round();
        if ratio >= 1.0 { ratio as u32 } else { 1 }
    })
}

/// Ensures the ring explicitly repeats its first vertex.
fn close_ring(mut ring: Vec<Coordinate>) -> Vec<Coordinate> {
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::EARTH_RADIUS_M;
    use ecoscore_geocoder::{GeocodeError, GeocodedPostcode, GeocodingProvider};

    struct StubGeocoder {
        result: Option<Coordinate>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl PostcodeGeocoder for StubGeocoder {
        async fn geocode(&self, _: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
            if self.fail {
                return Err(GeocodeError::Parse {
                    message: "stub failure".to_string(),
                });
            }
            Ok(self.result.map(|coordinate| GeocodedPostcode {
                coordinate,
                matched_postcode: None,
                provider: GeocodingProvider::PostcodesIo,
            }))
        }
    }

    struct StubProvider {
        footprints: Vec<RawFootprint>,
    }

    #[async_trait::async_trait]
    impl FootprintProvider for StubProvider {
        async fn nearby_footprints(
            &self,
            _: Coordinate,
            _: f64,
        ) -> Result<Vec<RawFootprint>, FootprintError> {
            Ok(self.footprints.clone())
        }
    }

    /// A geographic square of the given side length (m) centered at
    /// `(lat, lon)`.
    fn square(lat: f64, lon: f64, side_m: f64) -> Vec<Coordinate> {
        let half = side_m / 2.0;
        let dlat = (half / EARTH_RADIUS_M).to_degrees();
        let dlon = (half / (EARTH_RADIUS_M * lat.to_radians().cos())).to_degrees();
        vec![
            Coordinate::new(lat - dlat, lon - dlon),
            Coordinate::new(lat - dlat, lon + dlon),
            Coordinate::new(lat + dlat, lon + dlon),
            Coordinate::new(lat + dlat, lon - dlon),
        ]
    }

    fn resolver(geocoder: StubGeocoder, provider: StubProvider) -> BuildingResolver {
        BuildingResolver::new(Arc::new(geocoder), Arc::new(provider))
    }

    #[tokio::test]
    async fn resolves_nearest_footprint_with_area() {
        let center = Coordinate::new(51.5074, -0.1278);
        // ~120 m² building at the query point, a larger one 40 m away.
        let near = RawFootprint {
            ring: square(center.latitude, center.longitude, 120.0_f64.sqrt()),
            building_tag: Some("house".to_string()),
        };
        let far = RawFootprint {
            ring: square(center.latitude + 0.000_36, center.longitude, 30.0),
            building_tag: Some("warehouse".to_string()),
        };

        let resolver = resolver(
            StubGeocoder {
                result: None,
                fail: false,
            },
            StubProvider {
                footprints: vec![far, near],
            },
        );

        let footprint = resolver.resolve(center, None).await.unwrap();
        assert_eq!(footprint.building_type.as_deref(), Some("house"));
        assert!(
            (footprint.area_m2 - 120.0).abs() / 120.0 < 0.01,
            "expected ~120 m², got {}",
            footprint.area_m2
        );
        assert_eq!(footprint.floors, 1);
        assert_eq!(footprint.ring.first(), footprint.ring.last());
    }

    #[tokio::test]
    async fn derives_floor_count_from_declared_area() {
        let center = Coordinate::new(51.5074, -0.1278);
        let footprints = vec![RawFootprint {
            ring: square(center.latitude, center.longitude, 10.0),
            building_tag: None,
        }];
        let resolver = resolver(
            StubGeocoder {
                result: None,
                fail: false,
            },
            StubProvider { footprints },
        );

        // ~100 m² footprint, 240 m² declared -> 2 floors.
        let footprint = resolver.resolve(center, Some(240.0)).await.unwrap();
        assert_eq!(footprint.floors, 2);

        // Declared smaller than the footprint still floors at 1.
        let footprint = resolver.resolve(center, Some(40.0)).await.unwrap();
        assert_eq!(footprint.floors, 1);
    }

    #[tokio::test]
    async fn no_buildings_is_not_found() {
        let resolver = resolver(
            StubGeocoder {
                result: None,
                fail: false,
            },
            StubProvider {
                footprints: Vec::new(),
            },
        );
        let err = resolver
            .resolve(Coordinate::new(51.5, -0.1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FootprintError::NoBuildingFound { .. }));
    }

    #[tokio::test]
    async fn degenerate_polygons_are_discarded() {
        let center = Coordinate::new(51.5, -0.1);
        let resolver = resolver(
            StubGeocoder {
                result: None,
                fail: false,
            },
            StubProvider {
                footprints: vec![RawFootprint {
                    ring: vec![center, Coordinate::new(51.5001, -0.1)],
                    building_tag: None,
                }],
            },
        );
        let err = resolver.resolve(center, None).await.unwrap_err();
        assert!(matches!(err, FootprintError::NoBuildingFound { .. }));
    }

    #[tokio::test]
    async fn out_of_range_coordinate_is_a_validation_error() {
        let resolver = resolver(
            StubGeocoder {
                result: None,
                fail: false,
            },
            StubProvider {
                footprints: Vec::new(),
            },
        );
        let err = resolver
            .resolve(Coordinate::new(95.0, 0.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FootprintError::Validation { .. }));
    }

    #[tokio::test]
    async fn postcode_miss_maps_to_geocode_not_found() {
        let resolver = resolver(
            StubGeocoder {
                result: None,
                fail: false,
            },
            StubProvider {
                footprints: Vec::new(),
            },
        );
        let err = resolver.resolve_postcode("zz9 9zz").await.unwrap_err();
        match err {
            FootprintError::GeocodeNotFound { postcode } => assert_eq!(postcode, "ZZ9 9ZZ"),
            other => panic!("expected GeocodeNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn geocoder_failure_propagates() {
        let resolver = resolver(
            StubGeocoder {
                result: None,
                fail: true,
            },
            StubProvider {
                footprints: Vec::new(),
            },
        );
        let err = resolver.resolve_postcode("TV1 2AB").await.unwrap_err();
        assert!(matches!(err, FootprintError::Geocode(_)));
    }
}
