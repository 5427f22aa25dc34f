mod hexagon;
mod parse;

pub use hexagon::{closed_ring, corner_offset, create_hexagon, hex_center_corners};
pub use parse::{parse_geojson, parse_geometry, parse_wkt};
