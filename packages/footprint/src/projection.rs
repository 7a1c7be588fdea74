//! Local planar projection of geographic coordinates.
//!
//! An equirectangular projection centered on a reference coordinate,
//! using the mean Earth radius. Over building-footprint scales (tens of
//! meters) the distortion is negligible, which is exactly the regime this
//! module is used in.

use ecoscore_home_models::Coordinate;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A planar frame centered on a reference coordinate.
///
/// `project` maps a coordinate to `(x, y)` meters east/north of the
/// origin.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin: Coordinate,
    cos_origin_lat: f64,
}

impl LocalProjection {
    /// Creates a frame centered on `origin`.
    #[must_use]
    pub fn centered_on(origin: Coordinate) -> Self {
        Self {
            origin,
            cos_origin_lat: origin.latitude.to_radians().cos(),
        }
    }

    /// Projects a coordinate into this frame, in meters.
    #[must_use]
    pub fn project(&self, coordinate: Coordinate) -> (f64, f64) {
        let x = (coordinate.longitude - self.origin.longitude).to_radians()
            * self.cos_origin_lat
            * EARTH_RADIUS_M;
        let y = (coordinate.latitude - self.origin.latitude).to_radians() * EARTH_RADIUS_M;
        (x, y)
    }

    /// Planar distance from the frame origin to a coordinate, in meters.
    #[must_use]
    pub fn distance_from_origin_m(&self, coordinate: Coordinate) -> f64 {
        let (x, y) = self.project(coordinate);
        x.hypot(y)
    }
}

/// Approximate centroid of a vertex ring: the arithmetic mean of the
/// distinct vertices (a repeated closing vertex is ignored).
///
/// Good enough as a projection center and for nearest-building selection;
/// not an area-weighted centroid.
#[must_use]
pub fn approximate_centroid(ring: &[Coordinate]) -> Option<Coordinate> {
    let open = open_ring(ring);
    if open.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = open.len() as f64;
    let lat = open.iter().map(|c| c.latitude).sum::<f64>() / n;
    let lon = open.iter().map(|c| c.longitude).sum::<f64>() / n;
    Some(Coordinate::new(lat, lon))
}

/// Strips the repeated closing vertex from a ring, if present.
#[must_use]
pub fn open_ring(ring: &[Coordinate]) -> &[Coordinate] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}
