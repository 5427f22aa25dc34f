pub mod arrow;
pub mod csv;
pub mod parquet;

pub use arrow::HexCellsToArrow;
pub use csv::{CoordinateSource, CsvHexConfig, CsvToHex, GeometryFormat, csv_to_hex_csv};
pub use parquet::{
    HEX_SIZE_KEY, HexCellsToGeoParquet, LAYOUT_KEY, read_hex_size, write_geoparquet,
    write_geoparquet_with_metadata,
};
