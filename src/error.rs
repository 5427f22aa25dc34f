/// Error type for onomap-hex operations.
#[derive(Debug, PartialEq)]
pub enum OnoMapError {
    /// The hex size is not a finite, strictly positive number.
    InvalidHexSize(f64),
    /// A position has a NaN or infinite component.
    NonFiniteCoordinate { x: f64, y: f64 },
    /// A position lies outside the Web Mercator square or its cell index
    /// cannot be represented.
    OutOfGrid { x: f64, y: f64 },
    /// An extent query would return more cells than allowed.
    ExtentTooLarge { cells: u64, max: usize },
    /// Coordinate projection failed (WGS84 <-> Web Mercator).
    ProjectionError(String),
    /// Grid configuration could not be read or parsed.
    ConfigError(String),
    /// An aggregation service response could not be decoded.
    ResponseParseError(String),
    /// File I/O or serialization error.
    IoError(String),
    /// CSV parsing or reading error.
    CsvError(String),
    /// Failed to parse geometry from string (GeoJSON or WKT).
    GeometryParseError(String),
}

impl std::fmt::Display for OnoMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnoMapError::InvalidHexSize(size) => write!(f, "Invalid hex size: {}", size),
            OnoMapError::NonFiniteCoordinate { x, y } => {
                write!(f, "Non-finite coordinate: ({}, {})", x, y)
            }
            OnoMapError::OutOfGrid { x, y } => {
                write!(f, "Position ({}, {}) is outside the indexable grid", x, y)
            }
            OnoMapError::ExtentTooLarge { cells, max } => write!(
                f,
                "Extent covers about {} cells, more than the {} allowed",
                cells, max
            ),
            OnoMapError::ProjectionError(msg) => write!(f, "Projection error: {}", msg),
            OnoMapError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            OnoMapError::ResponseParseError(msg) => write!(f, "Response parse error: {}", msg),
            OnoMapError::IoError(msg) => write!(f, "IO error: {}", msg),
            OnoMapError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            OnoMapError::GeometryParseError(msg) => write!(f, "Geometry parse error: {}", msg),
        }
    }
}

impl std::error::Error for OnoMapError {}
