use crate::cell::HexCell;
use crate::error::OnoMapError;
use crate::index::WEB_MERCATOR_EPSG;
use arrow_array::{Float64Array, Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use geoarrow_array::IntoArrow;
use geoarrow_array::array::{PointArray, PolygonArray};
use geoarrow_array::builder::{PointBuilder, PolygonBuilder};
use geoarrow_schema::{Crs, Dimension, Metadata, PointType, PolygonType};
use rayon::prelude::*;
use std::sync::Arc;

fn web_mercator_metadata() -> Arc<Metadata> {
    let crs = Crs::from_authority_code(WEB_MERCATOR_EPSG.to_string());
    Arc::new(Metadata::new(crs, None))
}

/// Arrow export of a set of cells, with geometries in Web Mercator.
///
/// Implemented for `[HexCell]` and `Vec<HexCell>`.
pub trait HexCellsToArrow {
    fn to_arrow_points(&self) -> PointArray;
    /// Cell outlines; polygons are built in parallel.
    fn to_arrow_polygons(&self) -> PolygonArray;
    /// Columns q, r, size, x, y and the outline as `geometry`.
    fn to_record_batch(&self) -> Result<RecordBatch, OnoMapError>;
}

impl HexCellsToArrow for [HexCell] {
    fn to_arrow_points(&self) -> PointArray {
        let point = PointType::new(Dimension::XY, web_mercator_metadata());
        let mut builder = PointBuilder::with_capacity(point, self.len());

        for cell in self {
            builder.push_point(Some(&cell.center));
        }
        builder.finish()
    }

    fn to_arrow_polygons(&self) -> PolygonArray {
        let poly = PolygonType::new(Dimension::XY, web_mercator_metadata());
        let polygons: Vec<_> = self.par_iter().map(HexCell::to_polygon).collect();
        PolygonBuilder::from_polygons(&polygons, poly).finish()
    }

    fn to_record_batch(&self) -> Result<RecordBatch, OnoMapError> {
        let polygon_array = self.to_arrow_polygons();
        let qs: Int64Array = self.iter().map(|c| Some(c.q)).collect();
        let rs: Int64Array = self.iter().map(|c| Some(c.r)).collect();
        let sizes: Float64Array = self.iter().map(|c| Some(c.size)).collect();
        let xs: Float64Array = self.iter().map(|c| Some(c.x())).collect();
        let ys: Float64Array = self.iter().map(|c| Some(c.y())).collect();

        let geometry_field = polygon_array.extension_type().to_field("geometry", false);
        let schema = Schema::new(vec![
            Field::new("q", DataType::Int64, false),
            Field::new("r", DataType::Int64, false),
            Field::new("size", DataType::Float64, false),
            Field::new("x", DataType::Float64, false),
            Field::new("y", DataType::Float64, false),
            geometry_field,
        ]);

        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(qs),
                Arc::new(rs),
                Arc::new(sizes),
                Arc::new(xs),
                Arc::new(ys),
                Arc::new(polygon_array.into_arrow()),
            ],
        )
        .map_err(|e| OnoMapError::IoError(e.to_string()))
    }
}

impl HexCellsToArrow for Vec<HexCell> {
    fn to_arrow_points(&self) -> PointArray {
        self.as_slice().to_arrow_points()
    }

    fn to_arrow_polygons(&self) -> PolygonArray {
        self.as_slice().to_arrow_polygons()
    }

    fn to_record_batch(&self) -> Result<RecordBatch, OnoMapError> {
        self.as_slice().to_record_batch()
    }
}
