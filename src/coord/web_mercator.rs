use crate::coord::{Coordinate, ensure_finite};
use crate::error::OnoMapError;
use crate::index::{WEB_MERCATOR_EPSG, WGS84_EPSG};
use geo_types::{Coord, LineString, Point};
use proj::Proj;
use std::cell::RefCell;
use std::fmt;

fn projection(from: &str, to: &str) -> Result<Proj, OnoMapError> {
    Proj::new_known_crs(from, to, None).map_err(|e| OnoMapError::ProjectionError(e.to_string()))
}

fn convert(proj: &Proj, x: f64, y: f64) -> Result<Point<f64>, OnoMapError> {
    let (x, y) = proj
        .convert((x, y))
        .map_err(|e| OnoMapError::ProjectionError(e.to_string()))?;
    ensure_finite(&(x, y))
}

/// Wraps a longitude into `[-180, 180)`, keeping exactly `180` as is.
///
/// Same convention as Leaflet's `LatLng.wrap()`, which the map applies
/// before projecting pointer positions.
pub fn wrap_longitude(lon: f64) -> f64 {
    if lon == 180.0 {
        return lon;
    }
    ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0
}

/// Both directions of the WGS84 <-> Web Mercator projection, built once.
///
/// Creating a PROJ transformation is far more expensive than running it, so
/// hot paths (pointer moves, CSV rows) reuse one projector. The free
/// functions of this module share a per-thread instance.
pub struct WebMercatorProjector {
    forward: Proj,
    inverse: Proj,
}

impl WebMercatorProjector {
    pub fn new() -> Result<Self, OnoMapError> {
        Ok(Self {
            forward: projection(WGS84_EPSG, WEB_MERCATOR_EPSG)?,
            inverse: projection(WEB_MERCATOR_EPSG, WGS84_EPSG)?,
        })
    }

    /// Projects a WGS84 (lon, lat) position, wrapping the longitude first.
    pub fn to_web_mercator<C: Coordinate>(&self, coord: &C) -> Result<Point<f64>, OnoMapError> {
        convert(&self.forward, wrap_longitude(coord.x()), coord.y())
    }

    pub fn to_wgs84<C: Coordinate>(&self, coord: &C) -> Result<Point<f64>, OnoMapError> {
        convert(&self.inverse, coord.x(), coord.y())
    }

    pub fn line_to_web_mercator(&self, line: &LineString) -> Result<LineString, OnoMapError> {
        let coords = line
            .coords()
            .map(|c| self.to_web_mercator(c).map(Coord::from))
            .collect::<Result<Vec<_>, OnoMapError>>()?;
        Ok(LineString::from(coords))
    }

    /// Reprojects Web Mercator points to WGS84, failing on the first one that
    /// cannot be converted so a caller never ends up with a partial outline.
    pub fn points_to_wgs84(&self, points: &[Point<f64>]) -> Result<Vec<Coord>, OnoMapError> {
        points
            .iter()
            .map(|p| self.to_wgs84(p).map(Coord::from))
            .collect()
    }
}

impl fmt::Debug for WebMercatorProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebMercatorProjector")
            .field("from", &WGS84_EPSG)
            .field("to", &WEB_MERCATOR_EPSG)
            .finish()
    }
}

thread_local! {
    static PROJECTOR: RefCell<Option<WebMercatorProjector>> = const { RefCell::new(None) };
}

/// Runs `f` with this thread's projector, creating it on first use.
fn with_projector<T>(
    f: impl FnOnce(&WebMercatorProjector) -> Result<T, OnoMapError>,
) -> Result<T, OnoMapError> {
    PROJECTOR.with(|slot| {
        if slot.borrow().is_none() {
            let projector = WebMercatorProjector::new()?;
            *slot.borrow_mut() = Some(projector);
        }
        match slot.borrow().as_ref() {
            Some(projector) => f(projector),
            None => Err(OnoMapError::ProjectionError(
                "projection unavailable".to_string(),
            )),
        }
    })
}

/// Projects a WGS84 (lon, lat) position to Web Mercator meters.
///
/// The longitude is wrapped first. A position the projection cannot represent
/// (e.g. a pole) is reported as an error rather than a non-finite point.
pub fn wgs84_to_web_mercator<C: Coordinate>(coord: &C) -> Result<Point<f64>, OnoMapError> {
    with_projector(|p| p.to_web_mercator(coord))
}

/// Projects a Web Mercator position back to WGS84 (lon, lat).
pub fn web_mercator_to_wgs84<C: Coordinate>(coord: &C) -> Result<Point<f64>, OnoMapError> {
    with_projector(|p| p.to_wgs84(coord))
}

/// Projects every vertex of a WGS84 line string to Web Mercator.
pub fn wgs84_line_to_web_mercator(line: &LineString) -> Result<LineString, OnoMapError> {
    with_projector(|p| p.line_to_web_mercator(line))
}

pub(crate) fn web_mercator_points_to_wgs84(
    points: &[Point<f64>],
) -> Result<Vec<Coord>, OnoMapError> {
    with_projector(|p| p.points_to_wgs84(points))
}
