use crate::coord::{
    Coordinate, Crs, ensure_in_extent, web_mercator_points_to_wgs84, wgs84_line_to_web_mercator,
    wgs84_to_web_mercator,
};
use crate::error::OnoMapError;
use crate::geom::{create_hexagon, hex_center_corners};
use crate::grid::validate_size;
use crate::index::{AxialCoordinate, MAX_AXIAL_INDEX, axial_to_planar, planar_to_axial};
use crate::io::arrow::HexCellsToArrow;
use crate::io::parquet::HexCellsToGeoParquet;
use arrow_array::RecordBatch;
use geo::Centroid;
use geo_types::{Geometry, LineString, Point, Polygon};
use geoarrow_array::array::{PointArray, PolygonArray};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Axial offsets of the six neighbors: E, NE, NW, W, SW, SE.
const NEIGHBOR_OFFSETS: [(i64, i64); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// A single cell of the OnoMap hexagonal grid.
///
/// A cell is addressed by its integral axial coordinate `(q, r)`; the center is
/// in Web Mercator meters (EPSG:3857) and `size` is the grid's hex size.
///
/// # Example
///
/// ```
/// use onomap_hex::HexCell;
///
/// # fn main() -> Result<(), onomap_hex::OnoMapError> {
/// let cell = HexCell::from_planar(&(-172_950.0, 5_985_130.0), 15.0)?;
/// println!("qIndex={} rIndex={}", cell.q, cell.r);
///
/// // Outline to draw, first corner repeated last
/// let polygon = cell.to_polygon();
/// assert_eq!(polygon.exterior().0.len(), 7);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexCell {
    /// Axial column index (`qIndex` for the aggregation service)
    pub q: i64,
    /// Axial row index (`rIndex` for the aggregation service)
    pub r: i64,
    /// Cell center in Web Mercator meters
    pub center: Point<f64>,
    /// Hex size (corner radius) in meters
    pub size: f64,
}

impl HexCell {
    pub(crate) fn new(q: i64, r: i64, size: f64) -> Self {
        let center = axial_to_planar(AxialCoordinate::from((q, r)), size);
        Self { q, r, center, size }
    }

    /// Cell containing a planar point already checked against the extent.
    ///
    /// A tiny `size` can still push the index past what `i64` and `f64` hold
    /// exactly; such positions are rejected rather than saturated.
    fn locate(point: Point<f64>, size: f64) -> Result<Self, OnoMapError> {
        let hex = planar_to_axial(&point, size);
        if hex.q.abs() > MAX_AXIAL_INDEX || hex.r.abs() > MAX_AXIAL_INDEX {
            return Err(OnoMapError::OutOfGrid {
                x: point.x(),
                y: point.y(),
            });
        }
        Ok(Self::new(hex.q as i64, hex.r as i64, size))
    }

    /// Create the cell containing a Web Mercator position.
    ///
    /// # Errors
    ///
    /// - [`OnoMapError::InvalidHexSize`] - `size` is not finite and positive
    /// - [`OnoMapError::NonFiniteCoordinate`] - the position is NaN or infinite
    /// - [`OnoMapError::OutOfGrid`] - the position lies outside the Web Mercator
    ///   square, or its index is too large for `size`
    pub fn from_planar(coord: &impl Coordinate, size: f64) -> Result<Self, OnoMapError> {
        let size = validate_size(size)?;
        let point = ensure_in_extent(coord)?;
        Self::locate(point, size)
    }

    /// Create the cell containing a WGS84 (lon/lat) position.
    ///
    /// # Example
    /// ```
    /// use onomap_hex::HexCell;
    ///
    /// # fn main() -> Result<(), onomap_hex::OnoMapError> {
    /// let cell = HexCell::from_wgs84(&(-1.5536, 47.2184), 15.0)?;
    /// println!("{:?}", cell.query_params());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_wgs84(coord: &impl Coordinate, size: f64) -> Result<Self, OnoMapError> {
        let size = validate_size(size)?;
        let planar = wgs84_to_web_mercator(coord)?;
        Self::from_planar(&planar, size)
    }

    /// Create HexCells along a LineString in Web Mercator coordinates.
    ///
    /// Samples the line every half hex size and returns each distinct cell in
    /// the order it is first crossed.
    pub fn from_line_string_planar(
        line: &LineString,
        size: f64,
    ) -> Result<Vec<Self>, OnoMapError> {
        let size = validate_size(size)?;
        let step_size = size * 0.5;

        // Every sample lies between two vertices, so checking the vertices
        // bounds the whole walk
        for c in line.coords() {
            ensure_in_extent(c)?;
        }

        let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(line.0.len());
        let mut cells: Vec<HexCell> = Vec::with_capacity(line.0.len());

        let mut visit = |x: f64, y: f64| -> Result<(), OnoMapError> {
            let cell = Self::locate(Point::new(x, y), size)?;
            if seen.insert((cell.q, cell.r)) {
                cells.push(cell);
            }
            Ok(())
        };

        if let [only] = line.0.as_slice() {
            visit(only.x, only.y)?;
        }

        for window in line.0.windows(2) {
            let (start, end) = (&window[0], &window[1]);
            let dx = end.x - start.x;
            let dy = end.y - start.y;
            let steps = (dx.hypot(dy) / step_size).ceil() as usize;

            for i in 0..=steps {
                let t = if steps == 0 {
                    0.0
                } else {
                    i as f64 / steps as f64
                };
                visit(start.x + t * dx, start.y + t * dy)?;
            }
        }

        Ok(cells)
    }

    /// Create HexCells along a LineString in WGS84 coordinates.
    pub fn from_line_string_wgs84(
        line: &LineString,
        size: f64,
    ) -> Result<Vec<Self>, OnoMapError> {
        let planar = wgs84_line_to_web_mercator(line)?;
        Self::from_line_string_planar(&planar, size)
    }

    /// Create HexCells from an arbitrary `geo_types::Geometry`.
    ///
    /// Points and polygon centroids produce one cell each, lines are sampled,
    /// multi-geometries and collections are flattened.
    pub fn from_geometry(
        geom: Geometry<f64>,
        size: f64,
        crs: Crs,
    ) -> Result<Vec<Self>, OnoMapError> {
        let from_point = |pt: &Point<f64>| match crs {
            Crs::Wgs84 => Self::from_wgs84(pt, size),
            Crs::WebMercator => Self::from_planar(pt, size),
        };
        let from_line = |line: &LineString| match crs {
            Crs::Wgs84 => Self::from_line_string_wgs84(line, size),
            Crs::WebMercator => Self::from_line_string_planar(line, size),
        };

        match geom {
            Geometry::Point(pt) => Ok(vec![from_point(&pt)?]),
            Geometry::MultiPoint(mp) => mp.0.iter().map(from_point).collect(),
            Geometry::LineString(line) => from_line(&line),
            Geometry::MultiLineString(mls) => {
                let mut cells = Vec::new();
                for line in &mls.0 {
                    cells.extend(from_line(line)?);
                }
                Ok(cells)
            }
            Geometry::Polygon(poly) => poly
                .centroid()
                .map(|c| from_point(&c))
                .into_iter()
                .collect(),
            Geometry::MultiPolygon(mp) => mp
                .0
                .iter()
                .filter_map(|poly| poly.centroid())
                .map(|c| from_point(&c))
                .collect(),
            Geometry::GeometryCollection(gc) => {
                let mut cells = Vec::new();
                for g in gc.0 {
                    cells.extend(Self::from_geometry(g, size, crs)?);
                }
                Ok(cells)
            }
            _ => Err(OnoMapError::GeometryParseError(
                "Unsupported geometry type".to_string(),
            )),
        }
    }

    /// The cell address as an axial coordinate.
    pub fn axial(&self) -> AxialCoordinate {
        AxialCoordinate::from((self.q, self.r))
    }

    /// Web Mercator x of the cell center.
    pub fn x(&self) -> f64 {
        self.center.x()
    }

    /// Web Mercator y of the cell center.
    pub fn y(&self) -> f64 {
        self.center.y()
    }

    /// Request parameters identifying this cell to the aggregation service.
    pub fn query_params(&self) -> [(&'static str, i64); 2] {
        [("qIndex", self.q), ("rIndex", self.r)]
    }

    /// The six adjacent cells, E, NE, NW, W, SW, SE.
    pub fn neighbors(&self) -> [HexCell; 6] {
        NEIGHBOR_OFFSETS.map(|(dq, dr)| HexCell::new(self.q + dq, self.r + dr, self.size))
    }

    /// Number of cell steps to another cell.
    pub fn distance_to(&self, other: &HexCell) -> i64 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
    }

    /// The six corners in Web Mercator meters, open ring.
    pub fn corners(&self) -> [Point<f64>; 6] {
        hex_center_corners(&self.center, self.size)
    }

    /// Converts this cell to its hexagon in Web Mercator meters.
    pub fn to_polygon(&self) -> Polygon<f64> {
        create_hexagon(&self.center, self.size)
    }

    /// Converts this cell to its hexagon in WGS84, ready to draw on a map.
    ///
    /// Every corner is reprojected; if any one of them fails the whole outline
    /// is rejected, never a partial polygon.
    pub fn to_wgs84_polygon(&self) -> Result<Polygon<f64>, OnoMapError> {
        let mut coords = web_mercator_points_to_wgs84(&self.corners())?;
        coords.push(coords[0]);
        Ok(Polygon::new(LineString::from(coords), vec![]))
    }

    /// GeoJSON feature with the WGS84 outline and `q`/`r` properties.
    pub fn to_geojson_feature(&self) -> Result<geojson::Feature, OnoMapError> {
        let polygon = self.to_wgs84_polygon()?;
        let mut properties = geojson::JsonObject::new();
        properties.insert("q".to_string(), self.q.into());
        properties.insert("r".to_string(), self.r.into());

        Ok(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::from(&polygon)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }

    /// Converts this cell's center to an Arrow PointArray.
    pub fn to_arrow_points(&self) -> PointArray {
        std::slice::from_ref(self).to_arrow_points()
    }

    /// Converts this cell to an Arrow PolygonArray.
    pub fn to_arrow_polygons(&self) -> PolygonArray {
        std::slice::from_ref(self).to_arrow_polygons()
    }

    /// Converts this cell to an Arrow RecordBatch with all attributes.
    pub fn to_record_batch(&self) -> Result<RecordBatch, OnoMapError> {
        std::slice::from_ref(self).to_record_batch()
    }

    /// Writes this cell to a GeoParquet file.
    pub fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), OnoMapError> {
        std::slice::from_ref(self).to_geoparquet(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{SQRT_3, WEB_MERCATOR_EXTENT};
    use geo_types::{MultiPoint, MultiPolygon, polygon};

    const SIZE: f64 = 15.0;

    #[test]
    fn test_from_planar_origin() -> Result<(), OnoMapError> {
        let cell = HexCell::from_planar(&(0.0, 0.0), SIZE)?;

        assert_eq!((cell.q, cell.r), (0, 0));
        assert_eq!(cell.center, Point::new(0.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_from_planar_east() -> Result<(), OnoMapError> {
        let cell = HexCell::from_planar(&Point::new(SIZE * SQRT_3, 0.0), SIZE)?;
        assert_eq!((cell.q, cell.r), (1, 0));
        Ok(())
    }

    #[test]
    fn test_rejects_non_finite_position() {
        let result = HexCell::from_planar(&(f64::NAN, 0.0), SIZE);
        assert!(matches!(
            result,
            Err(OnoMapError::NonFiniteCoordinate { .. })
        ));
    }

    #[test]
    fn test_rejects_position_outside_grid() {
        for coord in [(1e300, 0.0), (0.0, -1e300), (2.1e7, 0.0)] {
            assert!(matches!(
                HexCell::from_planar(&coord, SIZE),
                Err(OnoMapError::OutOfGrid { .. })
            ));
        }
        // Inside the square, but the index would not fit at this size
        assert!(matches!(
            HexCell::from_planar(&(2e7, 2e7), 1e-300),
            Err(OnoMapError::OutOfGrid { .. })
        ));
    }

    #[test]
    fn test_extent_corner_cells_have_sane_neighbors() -> Result<(), OnoMapError> {
        let edge = WEB_MERCATOR_EXTENT;
        let cell = HexCell::from_planar(&(edge, -edge), SIZE)?;
        for n in cell.neighbors() {
            assert_eq!(cell.distance_to(&n), 1);
        }
        let opposite = HexCell::from_planar(&(-edge, edge), SIZE)?;
        assert!(cell.distance_to(&opposite) > 0);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_size() {
        for size in [0.0, -15.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                HexCell::from_planar(&(0.0, 0.0), size),
                Err(OnoMapError::InvalidHexSize(_))
            ));
        }
    }

    #[test]
    fn test_from_wgs84_nantes() -> Result<(), OnoMapError> {
        let cell = HexCell::from_wgs84(&(-1.5536, 47.2184), SIZE)?;

        // Nantes: roughly x = -172 946 m, y = 5 977 796 m in EPSG:3857
        assert!((cell.x() + 172_946.0).abs() < 30.0);
        assert!((cell.y() - 5_977_796.0).abs() < 30.0);

        let again = HexCell::from_planar(&cell.center, SIZE)?;
        assert_eq!(cell, again);
        Ok(())
    }

    #[test]
    fn test_same_point_same_cell() -> Result<(), OnoMapError> {
        let cell1 = HexCell::from_planar(&(-172_950.0, 5_985_130.0), SIZE)?;
        let cell2 = HexCell::from_planar(&(-172_950.0, 5_985_130.0), SIZE)?;
        assert_eq!(cell1, cell2);

        let cell3 = HexCell::from_planar(&(cell1.x() + 1.0, cell1.y() + 1.0), SIZE)?;
        assert_eq!(cell1, cell3);
        Ok(())
    }

    #[test]
    fn test_query_params() {
        let cell = HexCell::new(-11_530, 266_006, SIZE);
        assert_eq!(cell.query_params(), [("qIndex", -11_530), ("rIndex", 266_006)]);
    }

    #[test]
    fn test_neighbors() {
        let cell = HexCell::new(2, -1, SIZE);
        let neighbors = cell.neighbors();

        assert_eq!((neighbors[0].q, neighbors[0].r), (3, -1));
        assert_eq!((neighbors[5].q, neighbors[5].r), (2, 0));
        for n in &neighbors {
            assert_eq!(cell.distance_to(n), 1);
            // Neighbor centers are one apothem pair apart
            let d = (n.x() - cell.x()).hypot(n.y() - cell.y());
            assert!((d - SIZE * SQRT_3).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_to() {
        let a = HexCell::new(0, 0, SIZE);
        assert_eq!(a.distance_to(&HexCell::new(2, 1, SIZE)), 3);
        assert_eq!(a.distance_to(&HexCell::new(-3, 3, SIZE)), 3);
        assert_eq!(a.distance_to(&a), 0);
    }

    #[test]
    fn test_polygon_ring() {
        let cell = HexCell::new(5, -3, SIZE);
        let polygon = cell.to_polygon();
        let ring = &polygon.exterior().0;

        assert_eq!(ring.len(), 7);
        assert_eq!(ring[0], ring[6]);
        for c in &ring[..6] {
            assert!(((c.x - cell.x()).hypot(c.y - cell.y()) - SIZE).abs() < 1e-9);
        }
    }

    #[test]
    fn test_wgs84_polygon() -> Result<(), OnoMapError> {
        let cell = HexCell::from_wgs84(&(-1.5536, 47.2184), SIZE)?;
        let polygon = cell.to_wgs84_polygon()?;
        let ring = &polygon.exterior().0;

        assert_eq!(ring.len(), 7);
        assert_eq!(ring[0], ring[6]);
        for c in ring {
            assert!((c.x + 1.5536).abs() < 0.001);
            assert!((c.y - 47.2184).abs() < 0.001);
        }
        Ok(())
    }

    #[test]
    fn test_wgs84_polygon_rejects_unprojectable_corner() {
        let cell = HexCell {
            q: 0,
            r: 0,
            center: Point::new(f64::INFINITY, 0.0),
            size: SIZE,
        };
        assert!(cell.to_wgs84_polygon().is_err());
    }

    #[test]
    fn test_geojson_feature() -> Result<(), OnoMapError> {
        let cell = HexCell::from_wgs84(&(-1.5536, 47.2184), SIZE)?;
        let feature = cell.to_geojson_feature()?;

        assert!(feature.geometry.is_some());
        let props = feature.properties.unwrap_or_default();
        assert_eq!(props.get("q").and_then(|v| v.as_i64()), Some(cell.q));
        assert_eq!(props.get("r").and_then(|v| v.as_i64()), Some(cell.r));
        Ok(())
    }

    #[test]
    fn test_line_string_crosses_cells_in_order() -> Result<(), OnoMapError> {
        let east = SIZE * SQRT_3;
        let line = LineString::from(vec![(0.0, 0.0), (3.0 * east, 0.0)]);
        let cells = HexCell::from_line_string_planar(&line, SIZE)?;

        let addrs: Vec<_> = cells.iter().map(|c| (c.q, c.r)).collect();
        assert_eq!(addrs, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        Ok(())
    }

    #[test]
    fn test_line_string_outside_grid() {
        let line = LineString::from(vec![(0.0, 0.0), (1e300, 0.0)]);
        assert!(matches!(
            HexCell::from_line_string_planar(&line, SIZE),
            Err(OnoMapError::OutOfGrid { .. })
        ));
    }

    #[test]
    fn test_single_vertex_line() -> Result<(), OnoMapError> {
        let line = LineString::from(vec![(0.0, 0.0)]);
        let cells = HexCell::from_line_string_planar(&line, SIZE)?;
        assert_eq!(cells.len(), 1);
        Ok(())
    }

    #[test]
    fn test_from_geometry_point_matches_from_planar() -> Result<(), OnoMapError> {
        let coord = (-172_950.0, 5_985_130.0);
        let direct = HexCell::from_planar(&coord, SIZE)?;
        let via_geom = HexCell::from_geometry(
            Geometry::Point(Point::new(coord.0, coord.1)),
            SIZE,
            Crs::WebMercator,
        )?;

        assert_eq!(via_geom, vec![direct]);
        Ok(())
    }

    #[test]
    fn test_from_geometry_polygon_uses_centroid() -> Result<(), OnoMapError> {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 100.0),
            (x: 0.0, y: 100.0),
            (x: 0.0, y: 0.0),
        ];
        let cells = HexCell::from_geometry(Geometry::Polygon(poly), SIZE, Crs::WebMercator)?;

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0], HexCell::from_planar(&(50.0, 50.0), SIZE)?);
        Ok(())
    }

    #[test]
    fn test_from_geometry_multi() -> Result<(), OnoMapError> {
        let mp = MultiPoint::new(vec![Point::new(0.0, 0.0), Point::new(500.0, 500.0)]);
        let cells = HexCell::from_geometry(Geometry::MultiPoint(mp), SIZE, Crs::WebMercator)?;
        assert_eq!(cells.len(), 2);

        let mpoly = MultiPolygon::new(vec![
            polygon![
                (x: 0.0, y: 0.0),
                (x: 30.0, y: 0.0),
                (x: 30.0, y: 30.0),
                (x: 0.0, y: 0.0),
            ],
            polygon![
                (x: 900.0, y: 900.0),
                (x: 930.0, y: 900.0),
                (x: 930.0, y: 930.0),
                (x: 900.0, y: 900.0),
            ],
        ]);
        let cells =
            HexCell::from_geometry(Geometry::MultiPolygon(mpoly), SIZE, Crs::WebMercator)?;
        assert_eq!(cells.len(), 2);
        Ok(())
    }

    #[test]
    fn test_from_geometry_wgs84_point() -> Result<(), OnoMapError> {
        let cells = HexCell::from_geometry(
            Geometry::Point(Point::new(-1.5536, 47.2184)),
            SIZE,
            Crs::Wgs84,
        )?;
        assert_eq!(cells, vec![HexCell::from_wgs84(&(-1.5536, 47.2184), SIZE)?]);
        Ok(())
    }
}
