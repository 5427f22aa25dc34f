pub mod axial;
pub mod constants;
mod indexing;

pub use axial::{
    AxialCoordinate, CubeCoordinate, axial_to_cube, cube_to_axial, round_axial, round_cube,
};
pub use constants::{
    DEFAULT_HEX_SIZE, MAX_AXIAL_INDEX, MAX_EXTENT_CELLS, SQRT_3, WEB_MERCATOR_EPSG,
    WEB_MERCATOR_EXTENT, WGS84_EPSG,
};
pub use indexing::{axial_to_planar, planar_to_axial, planar_to_fractional_axial};
