/// Hex size (corner radius, meters) used by the OnoMap noise layer and its aggregation backend.
pub const DEFAULT_HEX_SIZE: f64 = 15.0;

/// `sqrt(3)`, correctly rounded.
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Geographic longitude/latitude.
pub const WGS84_EPSG: &str = "EPSG:4326";

/// Projected plane in which the hex grid is laid out.
pub const WEB_MERCATOR_EPSG: &str = "EPSG:3857";

/// Half the side of the Web Mercator square, in meters. Positions beyond it
/// are not on the map.
pub const WEB_MERCATOR_EXTENT: f64 = 20_037_508.342_789_244;

/// Largest axial index handed out (2^53). Every integer up to it is exact in
/// `f64`, and neighbor or distance arithmetic on such indices cannot overflow
/// `i64`.
pub const MAX_AXIAL_INDEX: f64 = 9_007_199_254_740_992.0;

/// Upper bound on the number of cells a single extent query may return.
pub const MAX_EXTENT_CELLS: usize = 2_000_000;
