use crate::coord::Coordinate;
use geo_types::{Coord, LineString, Point, Polygon};

/// Offset of corner `corner` (0-5) from the center of a hex of the given size.
///
/// Corner 0 sits at 30 degrees and the rest follow counter-clockwise every
/// 60 degrees, which makes the hexagon pointy-top.
pub fn corner_offset(size: f64, corner: usize) -> Point<f64> {
    let angle_deg = 60.0 * corner as f64 + 30.0;
    let angle_rad = angle_deg.to_radians();
    Point::new(size * angle_rad.cos(), size * angle_rad.sin())
}

/// The six corners of the hex centered on `center`, in corner order.
///
/// The ring is left open; see [`closed_ring`].
pub fn hex_center_corners<C: Coordinate>(center: &C, size: f64) -> [Point<f64>; 6] {
    std::array::from_fn(|i| {
        let offset = corner_offset(size, i);
        Point::new(center.x() + offset.x(), center.y() + offset.y())
    })
}

/// Closes a corner ring by repeating the first corner: 7 points.
pub fn closed_ring(corners: &[Point<f64>; 6]) -> LineString<f64> {
    let mut coords: Vec<Coord> = Vec::with_capacity(7);
    coords.extend(corners.iter().map(|p| Coord { x: p.x(), y: p.y() }));
    coords.push(coords[0]);
    LineString::from(coords)
}

/// Builds the closed hexagon polygon around `center`.
pub fn create_hexagon<C: Coordinate>(center: &C, size: f64) -> Polygon<f64> {
    Polygon::new(closed_ring(&hex_center_corners(center, size)), vec![])
}
