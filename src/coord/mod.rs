mod web_mercator;

pub(crate) use web_mercator::web_mercator_points_to_wgs84;

pub use web_mercator::{
    WebMercatorProjector, web_mercator_to_wgs84, wgs84_line_to_web_mercator,
    wgs84_to_web_mercator, wrap_longitude,
};

use crate::error::OnoMapError;
use crate::index::WEB_MERCATOR_EXTENT;
use geo_types::{Coord, Point};

/// Trait for types that can provide x/y coordinates.
///
/// Implemented for `(f64, f64)` tuples, `geo_types::Point<f64>` and
/// `geo_types::Coord<f64>` so every entry point accepts any of them.
pub trait Coordinate {
    /// Returns the x-coordinate (Web Mercator x or longitude).
    fn x(&self) -> f64;
    /// Returns the y-coordinate (Web Mercator y or latitude).
    fn y(&self) -> f64;
}

impl Coordinate for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }
    fn y(&self) -> f64 {
        self.1
    }
}

impl Coordinate for Point<f64> {
    fn x(&self) -> f64 {
        Point::x(*self)
    }
    fn y(&self) -> f64 {
        Point::y(*self)
    }
}

impl Coordinate for Coord<f64> {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
}

/// Coordinate reference system of input positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    /// WGS84 (EPSG:4326) - longitude/latitude coordinates
    #[default]
    Wgs84,
    /// Web Mercator (EPSG:3857) - the plane the hex grid lives in
    WebMercator,
}

/// Rejects positions with a NaN or infinite component.
///
/// A failed upstream projection shows up as a non-finite point; callers
/// skip that position instead of indexing or drawing it.
pub fn ensure_finite<C: Coordinate>(coord: &C) -> Result<Point<f64>, OnoMapError> {
    let (x, y) = (coord.x(), coord.y());
    if x.is_finite() && y.is_finite() {
        Ok(Point::new(x, y))
    } else {
        Err(OnoMapError::NonFiniteCoordinate { x, y })
    }
}

/// Rejects Web Mercator positions that are not finite or fall outside the
/// projected square (about +/-20 037 508 m on both axes).
pub fn ensure_in_extent<C: Coordinate>(coord: &C) -> Result<Point<f64>, OnoMapError> {
    // Projecting exactly 180 degrees may land an ulp past the edge
    const SLACK: f64 = 1e-3;
    let limit = WEB_MERCATOR_EXTENT + SLACK;
    let point = ensure_finite(coord)?;
    if point.x().abs() <= limit && point.y().abs() <= limit {
        Ok(point)
    } else {
        Err(OnoMapError::OutOfGrid {
            x: point.x(),
            y: point.y(),
        })
    }
}
