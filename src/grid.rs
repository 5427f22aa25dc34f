use crate::cell::HexCell;
use crate::coord::Coordinate;
use crate::error::OnoMapError;
use crate::geom::hex_center_corners;
use crate::index::{
    AxialCoordinate, DEFAULT_HEX_SIZE, MAX_AXIAL_INDEX, MAX_EXTENT_CELLS, SQRT_3,
    WEB_MERCATOR_EXTENT, axial_to_planar, planar_to_axial,
};
use geo_types::{LineString, Point, Polygon, Rect};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Checks that a hex size is finite and strictly positive.
pub(crate) fn validate_size(size: f64) -> Result<f64, OnoMapError> {
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(OnoMapError::InvalidHexSize(size))
    }
}

/// Grid configuration: the hex size in Web Mercator meters.
///
/// Deserializes from JSON such as `{"size": 15.0}`; a missing `size` falls
/// back to [`DEFAULT_HEX_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexGridConfig {
    size: f64,
}

impl Default for HexGridConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_HEX_SIZE,
        }
    }
}

impl HexGridConfig {
    pub fn new(size: f64) -> Result<Self, OnoMapError> {
        Ok(Self {
            size: validate_size(size)?,
        })
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Example
    /// ```
    /// use onomap_hex::HexGridConfig;
    ///
    /// let config = HexGridConfig::from_json_str(r#"{"size": 25.0}"#).unwrap();
    /// assert_eq!(config.size(), 25.0);
    /// ```
    pub fn from_json_str(s: &str) -> Result<Self, OnoMapError> {
        let config: HexGridConfig =
            serde_json::from_str(s).map_err(|e| OnoMapError::ConfigError(e.to_string()))?;
        Self::new(config.size)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OnoMapError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| OnoMapError::IoError(e.to_string()))?;
        Self::from_json_str(&text)
    }
}

/// The OnoMap hexagonal grid: every hex operation bound to one fixed size.
///
/// The grid holds no state besides its configuration, so it is `Copy` and can
/// be shared freely between map layers.
///
/// # Example
///
/// ```
/// use onomap_hex::HexGrid;
///
/// # fn main() -> Result<(), onomap_hex::OnoMapError> {
/// let grid = HexGrid::builder().size(15.0).build()?;
///
/// let cell = grid.cell_at(&(15.0 * 3.0_f64.sqrt(), 0.0))?;
/// assert_eq!((cell.q, cell.r), (1, 0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HexGrid {
    config: HexGridConfig,
}

impl HexGrid {
    pub fn builder() -> HexGridBuilder {
        HexGridBuilder::new()
    }

    pub fn new(size: f64) -> Result<Self, OnoMapError> {
        Self::from_config(HexGridConfig::new(size)?)
    }

    pub fn from_config(config: HexGridConfig) -> Result<Self, OnoMapError> {
        validate_size(config.size)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HexGridConfig {
        &self.config
    }

    pub fn size(&self) -> f64 {
        self.config.size
    }

    /// Center of a (possibly fractional) axial coordinate.
    pub fn hex_to_planar(&self, hex: AxialCoordinate) -> Point<f64> {
        axial_to_planar(hex, self.size())
    }

    /// Axial address of the cell containing a planar point.
    pub fn planar_to_hex<C: Coordinate>(&self, coord: &C) -> AxialCoordinate {
        planar_to_axial(coord, self.size())
    }

    /// The six corners of a hex centered on `center`.
    pub fn corners<C: Coordinate>(&self, center: &C) -> [Point<f64>; 6] {
        hex_center_corners(center, self.size())
    }

    /// The cell with axial address `(q, r)`.
    pub fn cell(&self, q: i64, r: i64) -> HexCell {
        HexCell::new(q, r, self.size())
    }

    /// The cell containing a Web Mercator point.
    pub fn cell_at<C: Coordinate>(&self, coord: &C) -> Result<HexCell, OnoMapError> {
        HexCell::from_planar(coord, self.size())
    }

    /// The cell containing a WGS84 (lon/lat) position.
    pub fn cell_at_wgs84<C: Coordinate>(&self, coord: &C) -> Result<HexCell, OnoMapError> {
        HexCell::from_wgs84(coord, self.size())
    }

    /// Every distinct cell crossed by a Web Mercator line, in crossing order.
    pub fn cells_along_line(&self, line: &LineString) -> Result<Vec<HexCell>, OnoMapError> {
        HexCell::from_line_string_planar(line, self.size())
    }

    /// All cells whose center lies inside `rect` (edges included), ordered by
    /// `r` then `q`.
    ///
    /// See [`cells_in_extent`](Self::cells_in_extent) for bounds handling.
    pub fn cells_in_rect(&self, rect: &Rect<f64>) -> Result<Vec<HexCell>, OnoMapError> {
        self.cells_in_extent(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    /// [`cells_in_rect`](Self::cells_in_rect) from raw bounds.
    ///
    /// Bounds are clipped to the Web Mercator square. Inverted, non-finite or
    /// fully outside bounds give an empty list.
    ///
    /// # Errors
    ///
    /// - [`OnoMapError::ExtentTooLarge`] - the clipped extent would hold more
    ///   than [`MAX_EXTENT_CELLS`] cells
    /// - [`OnoMapError::OutOfGrid`] - the grid size is so small that indices
    ///   inside the extent cannot be represented
    pub fn cells_in_extent(
        &self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<Vec<HexCell>, OnoMapError> {
        let bounds = [min_x, min_y, max_x, max_y];
        if bounds.iter().any(|v| !v.is_finite()) || min_x > max_x || min_y > max_y {
            return Ok(Vec::new());
        }

        let min_x = min_x.max(-WEB_MERCATOR_EXTENT);
        let min_y = min_y.max(-WEB_MERCATOR_EXTENT);
        let max_x = max_x.min(WEB_MERCATOR_EXTENT);
        let max_y = max_y.min(WEB_MERCATOR_EXTENT);
        if min_x > max_x || min_y > max_y {
            return Ok(Vec::new());
        }

        let size = self.size();
        let row_height = size * 1.5;
        let col_width = size * SQRT_3;

        let first_row = (min_y / row_height).floor();
        let last_row = (max_y / row_height).ceil();
        let estimate = (last_row - first_row + 1.0) * ((max_x - min_x) / col_width + 2.0);
        if estimate > MAX_EXTENT_CELLS as f64 {
            return Err(OnoMapError::ExtentTooLarge {
                cells: estimate as u64,
                max: MAX_EXTENT_CELLS,
            });
        }

        // |q| is at most |x| / col_width plus half of |r|
        let r_bound = first_row.abs().max(last_row.abs());
        let q_bound = min_x.abs().max(max_x.abs()) / col_width + r_bound / 2.0 + 1.0;
        if r_bound > MAX_AXIAL_INDEX || q_bound > MAX_AXIAL_INDEX {
            return Err(OnoMapError::OutOfGrid { x: max_x, y: max_y });
        }

        let (min_r, max_r) = (first_row as i64, last_row as i64);
        let mut cells = Vec::new();
        for r in min_r..=max_r {
            let shift = r as f64 / 2.0;
            let min_q = (min_x / col_width - shift).floor() as i64;
            let max_q = (max_x / col_width - shift).ceil() as i64;

            for q in min_q..=max_q {
                let cell = HexCell::new(q, r, size);
                let (x, y) = (cell.x(), cell.y());
                if x >= min_x && x <= max_x && y >= min_y && y <= max_y {
                    cells.push(cell);
                }
            }
        }
        debug!("{} cells in extent at size {}", cells.len(), size);
        Ok(cells)
    }

    /// Hexagon polygons of many cells, built in parallel.
    pub fn to_polygons(&self, cells: &[HexCell]) -> Vec<Polygon<f64>> {
        cells.par_iter().map(HexCell::to_polygon).collect()
    }

    /// Cell for a pointer position that may come from a failed projection.
    ///
    /// Returns `None` for a non-finite or out-of-grid position instead of an
    /// error.
    pub fn try_cell_at<C: Coordinate>(&self, coord: &C) -> Option<HexCell> {
        HexCell::from_planar(coord, self.size()).ok()
    }
}

#[derive(Debug, Default)]
pub struct HexGridBuilder {
    size: Option<f64>,
    config: Option<HexGridConfig>,
}

impl HexGridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn config(mut self, config: HexGridConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the grid. An explicit `size` wins over `config`; with neither,
    /// the map layer default of 15 m is used.
    pub fn build(self) -> Result<HexGrid, OnoMapError> {
        let config = match (self.size, self.config) {
            (Some(size), _) => HexGridConfig::new(size)?,
            (None, Some(config)) => config,
            (None, None) => HexGridConfig::default(),
        };
        HexGrid::from_config(config)
    }
}
