use crate::coord::Coordinate;
use crate::index::axial::{AxialCoordinate, round_axial};
use crate::index::constants::SQRT_3;
use geo_types::Point;

/// Converts an axial coordinate to the planar position of its cell center.
///
/// Pointy-top layout: `x = size * sqrt(3) * (q + r / 2)`, `y = size * 1.5 * r`.
/// Fractional input is fine, the mapping is linear.
pub fn axial_to_planar(hex: AxialCoordinate, size: f64) -> Point<f64> {
    let x = size * SQRT_3 * (hex.q + hex.r / 2.0);
    let y = size * 1.5 * hex.r;
    Point::new(x, y)
}

/// Exact inverse of [`axial_to_planar`], without rounding.
pub fn planar_to_fractional_axial<C: Coordinate>(coord: &C, size: f64) -> AxialCoordinate {
    let q = (coord.x() * SQRT_3 / 3.0 - coord.y() / 3.0) / size;
    let r = coord.y() * 2.0 / 3.0 / size;
    AxialCoordinate { q, r }
}

/// Returns the axial address of the cell containing a planar point.
///
/// Cell boundaries are whatever [`round_axial`] makes of the fractional
/// coordinate; no polygon containment test is involved.
///
/// # Example
/// ```
/// use onomap_hex::{AxialCoordinate, planar_to_axial};
///
/// let east = planar_to_axial(&(15.0 * 3.0_f64.sqrt(), 0.0), 15.0);
/// assert_eq!(east, AxialCoordinate::new(1.0, 0.0));
/// ```
pub fn planar_to_axial<C: Coordinate>(coord: &C, size: f64) -> AxialCoordinate {
    round_axial(planar_to_fractional_axial(coord, size))
}
