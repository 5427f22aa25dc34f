use crate::cell::HexCell;
use crate::coord::Crs;
use crate::error::OnoMapError;
use crate::geom::parse_geometry;
use crate::grid::validate_size;
use crate::index::DEFAULT_HEX_SIZE;
use csv::StringRecord;
use geo_types::Polygon;
use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Output columns written before the copied input columns.
const Q_COLUMN: &str = "q_index";
const R_COLUMN: &str = "r_index";
const GEOMETRY_COLUMN: &str = "hex_geometry";

enum SourceIndices {
    Geometry(usize),
    Coordinates { x_idx: usize, y_idx: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFormat {
    Wkt,
    GeoJson,
}

/// Where a measurement row keeps its position.
#[derive(Debug, Clone)]
pub enum CoordinateSource {
    /// A single column holding WKT or GeoJSON.
    GeometryColumn(String),
    /// Separate X/Y columns (lon/lat or Web Mercator meters).
    CoordinateColumns { x_column: String, y_column: String },
}

/// Settings for [`csv_to_hex_csv`].
#[derive(Debug, Clone)]
pub struct CsvHexConfig {
    pub source: CoordinateSource,
    pub exclude_columns: Vec<String>,
    pub size: f64,
    pub crs: Crs,
    pub include_hex_geometry: Option<GeometryFormat>,
    /// Log and drop rows whose position cannot be indexed instead of failing.
    pub skip_invalid_rows: bool,
}

impl CsvHexConfig {
    fn with_source(source: CoordinateSource) -> Self {
        Self {
            source,
            exclude_columns: Vec::new(),
            size: DEFAULT_HEX_SIZE,
            crs: Crs::default(),
            include_hex_geometry: None,
            skip_invalid_rows: false,
        }
    }

    /// Reads positions from a geometry column (WKT or GeoJSON).
    ///
    /// # Example
    /// ```
    /// use onomap_hex::{CsvHexConfig, Crs};
    ///
    /// let config = CsvHexConfig::new("the_geom").size(25.0).crs(Crs::WebMercator);
    /// assert_eq!(config.size, 25.0);
    /// ```
    pub fn new(geometry_column: impl Into<String>) -> Self {
        Self::with_source(CoordinateSource::GeometryColumn(geometry_column.into()))
    }

    /// Reads positions from two coordinate columns.
    ///
    /// # Example
    /// ```
    /// use onomap_hex::{CsvHexConfig, Crs};
    ///
    /// let config = CsvHexConfig::from_coords("lon", "lat").crs(Crs::Wgs84);
    /// ```
    pub fn from_coords(x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        Self::with_source(CoordinateSource::CoordinateColumns {
            x_column: x_column.into(),
            y_column: y_column.into(),
        })
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn exclude(mut self, columns: Vec<String>) -> Self {
        self.exclude_columns = columns;
        self
    }

    pub fn crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    /// Adds the planar cell outline as a `hex_geometry` column.
    pub fn with_hex_geometry(mut self, format: GeometryFormat) -> Self {
        self.include_hex_geometry = Some(format);
        self
    }

    pub fn skip_invalid_rows(mut self, skip: bool) -> Self {
        self.skip_invalid_rows = skip;
        self
    }
}

pub trait CsvToHex {
    fn to_hex_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvHexConfig,
    ) -> Result<(), OnoMapError>;
}

impl<P: AsRef<Path>> CsvToHex for P {
    fn to_hex_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvHexConfig,
    ) -> Result<(), OnoMapError> {
        csv_to_hex_csv(self, output_path, config)
    }
}

fn csv_error(e: impl ToString) -> OnoMapError {
    OnoMapError::CsvError(e.to_string())
}

fn column_index(headers: &StringRecord, name: &str, role: &str) -> Result<usize, OnoMapError> {
    if name.is_empty() {
        return Err(csv_error(format!("{} column name cannot be empty", role)));
    }
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| csv_error(format!("{} column '{}' not found", role, name)))
}

fn parse_field(record: &StringRecord, idx: usize, role: &str) -> Result<f64, OnoMapError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| csv_error(format!("Missing {} column at index {}", role, idx)))?
        .trim();
    raw.parse()
        .map_err(|_| csv_error(format!("Invalid {} coordinate: '{}'", role, raw)))
}

fn outline_string(polygon: &Polygon<f64>, format: GeometryFormat) -> String {
    match format {
        GeometryFormat::Wkt => {
            use wkt::ToWkt;
            polygon.wkt_string()
        }
        GeometryFormat::GeoJson => geojson::Geometry::from(polygon).to_string(),
    }
}

fn record_cells(
    record: &StringRecord,
    source: &SourceIndices,
    config: &CsvHexConfig,
) -> Result<Vec<HexCell>, OnoMapError> {
    match source {
        SourceIndices::Geometry(idx) => {
            let text = record
                .get(*idx)
                .ok_or_else(|| csv_error(format!("Missing geometry column at index {}", idx)))?;
            HexCell::from_geometry(parse_geometry(text)?, config.size, config.crs)
        }
        SourceIndices::Coordinates { x_idx, y_idx } => {
            let position = (
                parse_field(record, *x_idx, "X")?,
                parse_field(record, *y_idx, "Y")?,
            );
            let cell = match config.crs {
                Crs::Wgs84 => HexCell::from_wgs84(&position, config.size)?,
                Crs::WebMercator => HexCell::from_planar(&position, config.size)?,
            };
            Ok(vec![cell])
        }
    }
}

/// Assigns every row of a measurement CSV to hex cells.
///
/// Writes `q_index`, `r_index`, the optional `hex_geometry` and then every
/// input column except the position columns and `exclude_columns`. A row
/// whose geometry covers several cells is written once per cell. Rows are
/// streamed, so the input is never held in memory.
///
/// # Example
///
/// ```no_run
/// use onomap_hex::{csv_to_hex_csv, CsvHexConfig, Crs, GeometryFormat};
///
/// let config = CsvHexConfig::from_coords("lon", "lat")
///     .crs(Crs::Wgs84)
///     .with_hex_geometry(GeometryFormat::Wkt);
///
/// csv_to_hex_csv("measures.csv", "measures_hex.csv", &config).unwrap();
/// ```
pub fn csv_to_hex_csv(
    csv_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CsvHexConfig,
) -> Result<(), OnoMapError> {
    validate_size(config.size)?;

    let file = File::open(csv_path).map_err(csv_error)?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers().map_err(csv_error)?.clone();

    // Position columns are never copied to the output
    let (source, mut excluded): (SourceIndices, HashSet<usize>) = match &config.source {
        CoordinateSource::GeometryColumn(col) => {
            let idx = column_index(&headers, col, "Geometry")?;
            (SourceIndices::Geometry(idx), HashSet::from([idx]))
        }
        CoordinateSource::CoordinateColumns { x_column, y_column } => {
            let x_idx = column_index(&headers, x_column, "X")?;
            let y_idx = column_index(&headers, y_column, "Y")?;
            (
                SourceIndices::Coordinates { x_idx, y_idx },
                HashSet::from([x_idx, y_idx]),
            )
        }
    };
    excluded.extend(
        config
            .exclude_columns
            .iter()
            .filter_map(|name| headers.iter().position(|h| h == name)),
    );

    let out_file = File::create(output_path).map_err(|e| OnoMapError::IoError(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(out_file);

    let mut header_row: Vec<&str> = vec![Q_COLUMN, R_COLUMN];
    if config.include_hex_geometry.is_some() {
        header_row.push(GEOMETRY_COLUMN);
    }
    header_row.extend(
        headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(_, h)| h),
    );
    writer.write_record(&header_row).map_err(csv_error)?;

    let (mut rows, mut written, mut skipped) = (0usize, 0usize, 0usize);
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        rows += 1;

        let cells = match record_cells(&record, &source, config) {
            Ok(cells) => cells,
            Err(e) if config.skip_invalid_rows => {
                warn!("skipping row {}: {}", rows, e);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        for cell in cells {
            let mut row: Vec<String> = vec![cell.q.to_string(), cell.r.to_string()];
            if let Some(format) = config.include_hex_geometry {
                row.push(outline_string(&cell.to_polygon(), format));
            }
            row.extend(
                record
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !excluded.contains(i))
                    .map(|(_, field)| field.to_string()),
            );
            writer.write_record(&row).map_err(csv_error)?;
            written += 1;
        }
    }

    writer.flush().map_err(csv_error)?;
    info!(
        "indexed {} rows into {} cell rows ({} skipped)",
        rows, written, skipped
    );
    Ok(())
}
