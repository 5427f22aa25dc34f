use crate::cell::HexCell;
use crate::coord::{Coordinate, wgs84_to_web_mercator};
use crate::grid::HexGrid;
use geo_types::Polygon;
use log::{debug, warn};

/// A cell together with its outline in WGS84, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CellOutline {
    pub cell: HexCell,
    pub polygon: Polygon<f64>,
}

/// Follows the pointer over the map and reports when it enters a new cell.
///
/// Pointer-move events arrive far more often than the pointer changes cell,
/// so the outline only needs redrawing when the resolved address changes.
/// Positions that cannot be indexed are skipped without touching the state.
///
/// # Example
///
/// ```
/// use onomap_hex::{CellTracker, HexGrid};
///
/// let mut tracker = CellTracker::new(HexGrid::default());
///
/// assert!(tracker.update(&(0.0, 0.0)).is_some());
/// // Still inside cell (0, 0): nothing to redraw
/// assert!(tracker.update(&(2.0, 3.0)).is_none());
/// assert_eq!(tracker.last_drawn(), Some((0, 0)));
/// ```
#[derive(Debug, Clone)]
pub struct CellTracker {
    grid: HexGrid,
    last_drawn: Option<(i64, i64)>,
}

impl CellTracker {
    pub fn new(grid: HexGrid) -> Self {
        Self {
            grid,
            last_drawn: None,
        }
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Address of the last cell reported, if any.
    pub fn last_drawn(&self) -> Option<(i64, i64)> {
        self.last_drawn
    }

    /// Forgets the last cell, e.g. when the overlay is removed from the map.
    pub fn reset(&mut self) {
        self.last_drawn = None;
    }

    /// Feeds a Web Mercator pointer position.
    ///
    /// Returns the cell when it differs from the last one reported, `None` when
    /// the pointer stayed in the same cell or the position cannot be indexed
    /// (not finite, or off the map).
    pub fn update<C: Coordinate>(&mut self, coord: &C) -> Option<HexCell> {
        let cell = match self.grid.cell_at(coord) {
            Ok(cell) => cell,
            Err(e) => {
                debug!("skipping pointer position: {}", e);
                return None;
            }
        };

        let address = (cell.q, cell.r);
        if self.last_drawn == Some(address) {
            return None;
        }

        debug!("pointer entered cell q={} r={}", cell.q, cell.r);
        self.last_drawn = Some(address);
        Some(cell)
    }

    /// Feeds a WGS84 (lon/lat) pointer position and returns the outline to draw.
    ///
    /// The new cell is remembered before its outline is reprojected; if a
    /// corner cannot be reprojected nothing is drawn and the cell is not
    /// retried until the pointer leaves it.
    pub fn update_wgs84<C: Coordinate>(&mut self, coord: &C) -> Option<CellOutline> {
        let planar = match wgs84_to_web_mercator(coord) {
            Ok(p) => p,
            Err(e) => {
                debug!("skipping pointer position: {}", e);
                return None;
            }
        };

        let cell = self.update(&planar)?;
        self.outline(cell)
    }

    /// WGS84 outline of a cell that was just marked drawn, or `None` with a
    /// warning when a corner cannot be reprojected.
    fn outline(&self, cell: HexCell) -> Option<CellOutline> {
        match cell.to_wgs84_polygon() {
            Ok(polygon) => Some(CellOutline { cell, polygon }),
            Err(e) => {
                warn!(
                    "cannot draw outline of cell q={} r={}: {}",
                    cell.q, cell.r, e
                );
                None
            }
        }
    }
}
