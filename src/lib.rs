//! # onomap-hex
//!
//! Hexagonal cell indexing for the OnoMap noise map. Positions in the Web
//! Mercator plane are snapped to pointy-top axial cells `(q, r)` of a fixed
//! size, and cells are turned back into outlines for drawing.
//!
//! ### 1. `HexGrid` - the size-bound entry point
//!
//! ```
//! use onomap_hex::{HexGrid, SQRT_3};
//!
//! # fn main() -> Result<(), onomap_hex::OnoMapError> {
//! let grid = HexGrid::builder().size(15.0).build()?;
//!
//! let origin = grid.cell_at(&(0.0, 0.0))?;
//! assert_eq!((origin.q, origin.r), (0, 0));
//!
//! let east = grid.cell_at(&(15.0 * SQRT_3, 0.0))?;
//! assert_eq!((east.q, east.r), (1, 0));
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `HexCell` - one cell, from a map position
//!
//! ```
//! use onomap_hex::HexCell;
//!
//! # fn main() -> Result<(), onomap_hex::OnoMapError> {
//! // Pointer position in lon/lat, as a map click reports it
//! let cell = HexCell::from_wgs84(&(-1.5536, 47.2184), 15.0)?;
//! let [(_, q), (_, r)] = cell.query_params();
//! assert_eq!((q, r), (cell.q, cell.r));
//!
//! let outline = cell.to_wgs84_polygon()?;
//! assert_eq!(outline.exterior().0.len(), 7);
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. `CellTracker` - redraw only when the pointer changes cell
//!
//! ```
//! use onomap_hex::{CellTracker, HexGrid};
//!
//! let mut tracker = CellTracker::new(HexGrid::default());
//! if let Some(outline) = tracker.update_wgs84(&(2.3211, 48.8656)) {
//!     println!("draw {:?}", outline.polygon);
//! }
//! ```
//!
//! ### 4. `CsvToHex` - batch indexing of measurement files
//!
//! ```no_run
//! use onomap_hex::{CsvHexConfig, CsvToHex, Crs, GeometryFormat};
//!
//! let config = CsvHexConfig::new("the_geom")
//!     .crs(Crs::Wgs84)
//!     .with_hex_geometry(GeometryFormat::GeoJson);
//!
//! "measures.csv".to_hex_csv("measures_hex.csv", &config).unwrap();
//! ```

pub mod cell;
pub mod coord;
pub mod error;
pub mod geom;
pub mod grid;
pub mod index;
pub mod io;
pub mod noise;
pub mod tracker;

pub use cell::HexCell;
pub use coord::{
    Coordinate, Crs, WebMercatorProjector, ensure_finite, ensure_in_extent, web_mercator_to_wgs84,
    wgs84_line_to_web_mercator, wgs84_to_web_mercator, wrap_longitude,
};
pub use error::OnoMapError;
pub use geom::{closed_ring, corner_offset, create_hexagon, hex_center_corners, parse_geometry};
pub use grid::{HexGrid, HexGridBuilder, HexGridConfig};
pub use index::{
    AxialCoordinate, CubeCoordinate, DEFAULT_HEX_SIZE, MAX_EXTENT_CELLS, SQRT_3,
    WEB_MERCATOR_EXTENT, axial_to_cube, axial_to_planar, cube_to_axial, planar_to_axial,
    planar_to_fractional_axial, round_axial, round_cube,
};
pub use io::{
    CoordinateSource, CsvHexConfig, CsvToHex, GeometryFormat, HexCellsToArrow,
    HexCellsToGeoParquet, csv_to_hex_csv, read_hex_size, write_geoparquet,
};
pub use noise::{AreaInfo, HourLevel, NoiseRamp, WeeklyProfile};
pub use tracker::{CellOutline, CellTracker};

pub use geo_types;
pub use geoarrow_array;
pub use geoarrow_schema;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_and_east_neighbor() -> Result<(), OnoMapError> {
        let grid = HexGrid::new(15.0)?;
        assert_eq!(grid.planar_to_hex(&(0.0, 0.0)), AxialCoordinate::new(0.0, 0.0));
        assert_eq!(
            grid.planar_to_hex(&(15.0 * SQRT_3, 0.0)),
            AxialCoordinate::new(1.0, 0.0)
        );

        let fractional = planar_to_fractional_axial(&(15.0 * SQRT_3 * 0.9, 0.0), 15.0);
        assert!(!fractional.is_integral());
        assert_eq!(round_axial(fractional), AxialCoordinate::new(1.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_closed_outline_of_every_nearby_cell() -> Result<(), OnoMapError> {
        let grid = HexGrid::default();
        for cell in grid.cells_in_extent(-60.0, -60.0, 60.0, 60.0)? {
            let ring = cell.to_polygon().exterior().0.clone();
            assert_eq!(ring.len(), 7);
            assert_eq!(ring.first(), ring.last());

            // The center is indexed back to its own cell
            assert_eq!(grid.cell_at(&cell.center)?, cell);
        }
        Ok(())
    }

    #[test]
    fn test_click_to_query_and_outline() -> Result<(), OnoMapError> {
        let grid = HexGrid::default();
        let click = (2.321125, 48.865633);

        let cell = grid.cell_at_wgs84(&click)?;
        let planar = wgs84_to_web_mercator(&click)?;
        assert_eq!(cell, grid.cell_at(&planar)?);
        assert_eq!(cell.query_params(), [("qIndex", cell.q), ("rIndex", cell.r)]);

        let outline = cell.to_wgs84_polygon()?;
        for corner in outline.exterior().coords() {
            // A 15 m cell spans well under a thousandth of a degree
            assert!((corner.x - click.0).abs() < 1e-3);
            assert!((corner.y - click.1).abs() < 1e-3);
        }
        Ok(())
    }

    #[test]
    fn test_noise_dial_for_area() -> Result<(), OnoMapError> {
        let info = AreaInfo::from_json_str(
            r#"{"leq":63.4,"profile":[{"la50":41.0},null,{"la50":72.0}]}"#,
        )?;
        let ramp = NoiseRamp::default();
        let weekly = info.weekly_profile();

        let colors = ramp.slice_colors(&weekly.week);
        assert_eq!(colors[0], "#B8D6D1");
        assert_eq!(colors[1], noise::MISSING_HOUR_COLOR);
        assert_eq!(colors[2], "#A11A4D");
        assert!(ramp.slice_colors(&weekly.sunday).iter().all(|c| *c == "white"));
        Ok(())
    }
}
