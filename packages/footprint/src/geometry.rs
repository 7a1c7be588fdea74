//! Planar polygon geometry on projected vertices.

use ecoscore_home_models::Coordinate;

use crate::projection::{LocalProjection, approximate_centroid, open_ring};

/// Computes the planar area of a vertex ring in m².
///
/// The ring is projected into a local frame centered on its approximate
/// centroid, then the shoelace (signed polygon area) formula is applied
/// and the absolute value taken — vertex winding order does not matter.
///
/// Returns `None` for degenerate rings: fewer than 3 distinct vertices,
/// or zero enclosed area (collinear vertices).
#[must_use]
pub fn ring_area_m2(ring: &[Coordinate]) -> Option<f64> {
    let open = open_ring(ring);
    if distinct_vertex_count(open) < 3 {
        return None;
    }

    let centroid = approximate_centroid(open)?;
    let frame = LocalProjection::centered_on(centroid);
    let projected: Vec<(f64, f64)> = open.iter().map(|&c| frame.project(c)).collect();

    let mut twice_signed_area = 0.0;
    for i in 0..projected.len() {
        let (x1, y1) = projected[i];
        let (x2, y2) = projected[(i + 1) % projected.len()];
        twice_signed_area += x1.mul_add(y2, -(x2 * y1));
    }

    let area = twice_signed_area.abs() / 2.0;
    (area > 0.0).then_some(area)
}

/// Counts distinct vertices in an already-open ring.
fn distinct_vertex_count(open: &[Coordinate]) -> usize {
    let mut distinct: Vec<Coordinate> = Vec::with_capacity(open.len());
    for &vertex in open {
        if !distinct.contains(&vertex) {
            distinct.push(vertex);
        }
    }
    distinct.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::EARTH_RADIUS_M;

    /// Builds a geographic square of the given side length (meters)
    /// centered on `(lat, lon)`.
    fn square_ring(lat: f64, lon: f64, side_m: f64) -> Vec<Coordinate> {
        let half = side_m / 2.0;
        let dlat = (half / EARTH_RADIUS_M).to_degrees();
        let dlon = (half / (EARTH_RADIUS_M * lat.to_radians().cos())).to_degrees();
        vec![
            Coordinate::new(lat - dlat, lon - dlon),
            Coordinate::new(lat - dlat, lon + dlon),
            Coordinate::new(lat + dlat, lon + dlon),
            Coordinate::new(lat + dlat, lon - dlon),
            Coordinate::new(lat - dlat, lon - dlon),
        ]
    }

    #[test]
    fn square_area_matches_reference_within_one_percent() {
        let ring = square_ring(51.5074, -0.1278, 10.0);
        let area = ring_area_m2(&ring).unwrap();
        assert!(
            (area - 100.0).abs() / 100.0 < 0.01,
            "10 m square should be ~100 m², got {area}"
        );
    }

    #[test]
    fn winding_order_does_not_matter() {
        let mut ring = square_ring(51.5074, -0.1278, 10.0);
        let clockwise_area = ring_area_m2(&ring).unwrap();
        ring.reverse();
        let counter_area = ring_area_m2(&ring).unwrap();
        assert!((clockwise_area - counter_area).abs() < 1e-9);
    }

    #[test]
    fn unclosed_ring_is_handled() {
        let mut ring = square_ring(51.5074, -0.1278, 10.0);
        ring.pop();
        let area = ring_area_m2(&ring).unwrap();
        assert!((area - 100.0).abs() / 100.0 < 0.01);
    }

    #[test]
    fn degenerate_rings_have_no_area() {
        assert!(ring_area_m2(&[]).is_none());
        assert!(
            ring_area_m2(&[Coordinate::new(51.5, 0.0), Coordinate::new(51.6, 0.0)]).is_none()
        );
        // Collinear vertices enclose nothing.
        assert!(
            ring_area_m2(&[
                Coordinate::new(51.5, 0.0),
                Coordinate::new(51.6, 0.0),
                Coordinate::new(51.7, 0.0),
            ])
            .is_none()
        );
    }
}
