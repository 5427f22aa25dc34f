use crate::cell::HexCell;
use crate::error::OnoMapError;
use crate::index::WEB_MERCATOR_EPSG;
use crate::io::arrow::HexCellsToArrow;
use arrow_array::RecordBatch;
use geoparquet::writer::{
    GeoParquetRecordBatchEncoder, GeoParquetWriterEncoding, GeoParquetWriterOptionsBuilder,
};
use log::{debug, warn};
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;

/// File metadata key holding the hex size shared by every cell.
pub const HEX_SIZE_KEY: &str = "onomap:hex_size";
/// File metadata key describing how `q` and `r` address the plane.
pub const LAYOUT_KEY: &str = "onomap:layout";

const LAYOUT: &str = "pointy-top axial";

fn io_error(e: impl ToString) -> OnoMapError {
    OnoMapError::IoError(e.to_string())
}

/// Grid description stored next to the GeoParquet `geo` entry.
///
/// The size is only recorded when all cells agree on it.
fn grid_metadata(cells: &[HexCell]) -> Vec<KeyValue> {
    let mut entries = vec![
        KeyValue::new(LAYOUT_KEY.to_string(), LAYOUT.to_string()),
        KeyValue::new("onomap:crs".to_string(), WEB_MERCATOR_EPSG.to_string()),
    ];
    match cells.split_first() {
        Some((first, rest)) if rest.iter().all(|c| c.size == first.size) => {
            entries.push(KeyValue::new(HEX_SIZE_KEY.to_string(), first.size.to_string()));
        }
        Some(_) => warn!("cells mix hex sizes, {} not written", HEX_SIZE_KEY),
        None => {}
    }
    entries
}

/// Writes a batch with a GeoArrow `geometry` column to a GeoParquet file,
/// geometries encoded as WKB.
pub fn write_geoparquet(batch: &RecordBatch, path: impl AsRef<Path>) -> Result<(), OnoMapError> {
    write_geoparquet_with_metadata(batch, path, Vec::new())
}

/// [`write_geoparquet`] with extra file-level key/value entries.
pub fn write_geoparquet_with_metadata(
    batch: &RecordBatch,
    path: impl AsRef<Path>,
    extra: Vec<KeyValue>,
) -> Result<(), OnoMapError> {
    let path = path.as_ref();
    let options = GeoParquetWriterOptionsBuilder::default()
        .set_encoding(GeoParquetWriterEncoding::WKB)
        .build();
    let mut encoder =
        GeoParquetRecordBatchEncoder::try_new(&batch.schema(), &options).map_err(io_error)?;

    let file = File::create(path).map_err(io_error)?;
    let mut writer =
        ArrowWriter::try_new(file, encoder.target_schema(), None).map_err(io_error)?;
    writer
        .write(&encoder.encode_record_batch(batch).map_err(io_error)?)
        .map_err(io_error)?;

    writer.append_key_value_metadata(encoder.into_keyvalue().map_err(io_error)?);
    for entry in extra {
        writer.append_key_value_metadata(entry);
    }
    writer.finish().map_err(io_error)?;

    debug!("wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

/// Hex size recorded in a file written by [`HexCellsToGeoParquet`].
///
/// `None` when the file carries no size, e.g. because its cells mixed sizes.
pub fn read_hex_size(path: impl AsRef<Path>) -> Result<Option<f64>, OnoMapError> {
    let file = File::open(path).map_err(io_error)?;
    let reader = SerializedFileReader::new(file).map_err(io_error)?;
    let Some(entries) = reader.metadata().file_metadata().key_value_metadata() else {
        return Ok(None);
    };
    entries
        .iter()
        .find(|kv| kv.key == HEX_SIZE_KEY)
        .and_then(|kv| kv.value.as_deref())
        .map(|v| {
            v.parse::<f64>()
                .map_err(|e| OnoMapError::IoError(format!("bad {}: {}", HEX_SIZE_KEY, e)))
        })
        .transpose()
}

/// Cells to GeoParquet, tagged with the grid they belong to.
pub trait HexCellsToGeoParquet: HexCellsToArrow {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), OnoMapError>;
}

impl HexCellsToGeoParquet for [HexCell] {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), OnoMapError> {
        let batch = self.to_record_batch()?;
        write_geoparquet_with_metadata(&batch, path, grid_metadata(self))
    }
}

impl HexCellsToGeoParquet for Vec<HexCell> {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), OnoMapError> {
        self.as_slice().to_geoparquet(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::HexGrid;
    use tempfile::tempdir;

    fn file_entries(path: &Path) -> Result<(i64, Vec<KeyValue>), OnoMapError> {
        let reader = SerializedFileReader::new(File::open(path).map_err(io_error)?)
            .map_err(io_error)?;
        let meta = reader.metadata().file_metadata();
        Ok((
            meta.num_rows(),
            meta.key_value_metadata().cloned().unwrap_or_default(),
        ))
    }

    #[test]
    fn test_cells_to_geoparquet() -> Result<(), OnoMapError> {
        let grid = HexGrid::default();
        let cells = grid.cells_in_extent(-100.0, -100.0, 100.0, 100.0)?;
        assert!(!cells.is_empty());

        let dir = tempdir().map_err(io_error)?;
        let path = dir.path().join("cells.parquet");
        cells.to_geoparquet(&path)?;

        let (rows, entries) = file_entries(&path)?;
        assert_eq!(rows, cells.len() as i64);

        let value = |key: &str| {
            entries
                .iter()
                .find(|kv| kv.key == key)
                .and_then(|kv| kv.value.clone())
        };
        assert!(value("geo").is_some());
        assert_eq!(value(LAYOUT_KEY).as_deref(), Some(LAYOUT));
        assert_eq!(value("onomap:crs").as_deref(), Some("EPSG:3857"));
        assert_eq!(read_hex_size(&path)?, Some(15.0));
        Ok(())
    }

    #[test]
    fn test_mixed_sizes_leave_size_out() -> Result<(), OnoMapError> {
        let cells = vec![HexCell::new(0, 0, 15.0), HexCell::new(0, 0, 30.0)];

        let dir = tempdir().map_err(io_error)?;
        let path = dir.path().join("mixed.parquet");
        cells.to_geoparquet(&path)?;

        assert_eq!(read_hex_size(&path)?, None);
        let (rows, _) = file_entries(&path)?;
        assert_eq!(rows, 2);
        Ok(())
    }

    #[test]
    fn test_plain_batch_has_no_grid_entries() -> Result<(), OnoMapError> {
        let batch = vec![HexCell::new(2, -1, 15.0)].to_record_batch()?;

        let dir = tempdir().map_err(io_error)?;
        let path = dir.path().join("plain.parquet");
        write_geoparquet(&batch, &path)?;

        let (_, entries) = file_entries(&path)?;
        assert!(entries.iter().all(|kv| !kv.key.starts_with("onomap:")));
        assert_eq!(read_hex_size(&path)?, None);
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let cells = vec![HexGrid::default().cell(0, 0)];
        let result = cells.to_geoparquet("/nonexistent-dir/cells.parquet");
        assert!(matches!(result, Err(OnoMapError::IoError(_))));
        assert!(matches!(
            read_hex_size("/nonexistent-dir/cells.parquet"),
            Err(OnoMapError::IoError(_))
        ));
    }
}
