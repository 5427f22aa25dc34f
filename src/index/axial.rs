use serde::{Deserialize, Serialize};

/// Axial hex coordinate `(q, r)`.
///
/// Integral values address exactly one cell. Fractional values come out of
/// [`planar_to_fractional_axial`](crate::planar_to_fractional_axial) and have to
/// go through [`round_axial`] before they name a cell.
///
/// # Example
/// ```
/// use onomap_hex::{AxialCoordinate, round_axial};
///
/// let snapped = round_axial(AxialCoordinate::new(0.9, 0.2));
/// assert_eq!(snapped, AxialCoordinate::new(1.0, 0.0));
/// assert!(snapped.is_integral());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxialCoordinate {
    /// Column axis
    pub q: f64,
    /// Row axis
    pub r: f64,
}

impl AxialCoordinate {
    pub fn new(q: f64, r: f64) -> Self {
        Self { q, r }
    }

    /// Both components are finite.
    pub fn is_finite(&self) -> bool {
        self.q.is_finite() && self.r.is_finite()
    }

    /// Both components are whole numbers, i.e. this addresses a single cell.
    pub fn is_integral(&self) -> bool {
        self.is_finite() && self.q.fract() == 0.0 && self.r.fract() == 0.0
    }

    /// Number of cell steps between two coordinates (cube distance).
    pub fn distance(&self, other: &AxialCoordinate) -> f64 {
        let a = axial_to_cube(*self);
        let b = axial_to_cube(*other);
        ((a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs()) / 2.0
    }
}

impl From<(i64, i64)> for AxialCoordinate {
    fn from((q, r): (i64, i64)) -> Self {
        Self::new(q as f64, r as f64)
    }
}

/// Cube hex coordinate `(x, y, z)` with `x + y + z == 0`.
///
/// Only used to make nearest-cell rounding well defined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CubeCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CubeCoordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Sum of the three axes.
    ///
    /// Evaluated as `x + z + y`: for a cube built by [`axial_to_cube`], `y` is
    /// exactly `-(x + z)` so this is exactly zero for every finite input.
    pub fn sum(&self) -> f64 {
        self.x + self.z + self.y
    }
}

/// Axial to cube: `x = q`, `z = r`, `y = -x - z`. No rounding.
pub fn axial_to_cube(hex: AxialCoordinate) -> CubeCoordinate {
    let x = hex.q;
    let z = hex.r;
    let y = -x - z;
    CubeCoordinate { x, y, z }
}

/// Cube to axial: `q = x`, `r = z`. `y` is redundant and dropped.
pub fn cube_to_axial(cube: CubeCoordinate) -> AxialCoordinate {
    AxialCoordinate {
        q: cube.x,
        r: cube.z,
    }
}

/// Rounds a fractional cube coordinate to the nearest cell.
///
/// # Process
///
/// 1. Rounds `x`, `y` and `z` independently, halves away from zero
/// 2. Measures how far each axis moved
/// 3. Recomputes one axis from the other two so that `x + y + z == 0`:
///    - `x` if it moved strictly more than both `y` and `z`
///    - otherwise `y` if it moved strictly more than `z`
///    - otherwise `z`
///
/// The checks run in exactly that order. On ties the earlier branch is not
/// taken, so `dx == dy > dz` corrects `y`, and `dy == dz` always corrects `z`.
/// The server-side aggregation grid resolves boundary points the same way.
///
/// # Example
/// ```
/// use onomap_hex::{CubeCoordinate, round_cube};
///
/// // dx == dy > dz: the y axis absorbs the correction
/// let cell = round_cube(CubeCoordinate::new(0.5, 0.5, -1.0));
/// assert_eq!(cell, CubeCoordinate::new(1.0, 0.0, -1.0));
/// ```
pub fn round_cube(cube: CubeCoordinate) -> CubeCoordinate {
    let mut rx = cube.x.round();
    let mut ry = cube.y.round();
    let mut rz = cube.z.round();

    let x_diff = (rx - cube.x).abs();
    let y_diff = (ry - cube.y).abs();
    let z_diff = (rz - cube.z).abs();

    if x_diff > y_diff && x_diff > z_diff {
        rx = -ry - rz;
    } else if y_diff > z_diff {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }

    CubeCoordinate {
        x: rx,
        y: ry,
        z: rz,
    }
}

/// Snaps a fractional axial coordinate to the address of the cell containing it.
pub fn round_axial(hex: AxialCoordinate) -> AxialCoordinate {
    cube_to_axial(round_cube(axial_to_cube(hex)))
}
