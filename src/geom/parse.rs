use crate::error::OnoMapError;
use geo_types::Geometry;
use geojson::GeoJson;
use std::str::FromStr;
use wkt::Wkt;

fn parse_error(msg: impl ToString) -> OnoMapError {
    OnoMapError::GeometryParseError(msg.to_string())
}

/// Parses a geometry cell from a measurement file.
///
/// Text starting with `{` is read as GeoJSON, anything else as WKT.
pub fn parse_geometry(s: &str) -> Result<Geometry<f64>, OnoMapError> {
    match s.trim() {
        "" => Err(parse_error("Empty geometry")),
        t if t.starts_with('{') => parse_geojson(t),
        t => parse_wkt(t),
    }
}

/// Parses a GeoJSON geometry or feature.
pub fn parse_geojson(s: &str) -> Result<Geometry<f64>, OnoMapError> {
    let geojson: GeoJson = s.parse().map_err(|e: geojson::Error| parse_error(e))?;

    let geometry = match geojson {
        GeoJson::Geometry(geom) => geom,
        GeoJson::Feature(feat) => feat
            .geometry
            .ok_or_else(|| parse_error("Feature has no geometry"))?,
        GeoJson::FeatureCollection(_) => {
            return Err(parse_error(
                "FeatureCollection not supported, one geometry per row",
            ));
        }
    };
    Geometry::try_from(geometry).map_err(parse_error)
}

/// Parses a WKT string.
pub fn parse_wkt(s: &str) -> Result<Geometry<f64>, OnoMapError> {
    let wkt: Wkt<f64> = Wkt::from_str(s).map_err(parse_error)?;
    wkt.try_into()
        .map_err(|_| parse_error("WKT has no geo-types equivalent"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_point() -> Result<(), OnoMapError> {
        let json = r#"{"type":"Point","coordinates":[-1.5536,47.2184]}"#;
        match parse_geometry(json)? {
            Geometry::Point(pt) => {
                assert!((pt.x() + 1.5536).abs() < 1e-9);
                assert!((pt.y() - 47.2184).abs() < 1e-9);
            }
            other => panic!("Expected Point, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_geojson_feature_track() -> Result<(), OnoMapError> {
        let json = r#"{"type":"Feature","properties":{"leq":61.2},
            "geometry":{"type":"LineString","coordinates":[[-1.55,47.21],[-1.56,47.22]]}}"#;
        match parse_geometry(json)? {
            Geometry::LineString(line) => assert_eq!(line.0.len(), 2),
            other => panic!("Expected LineString, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_geojson_feature_without_geometry() {
        let json = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        assert!(matches!(
            parse_geometry(json),
            Err(OnoMapError::GeometryParseError(_))
        ));
    }

    #[test]
    fn test_feature_collection_rejected() {
        let json = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(parse_geometry(json).is_err());
    }

    #[test]
    fn test_wkt_point() -> Result<(), OnoMapError> {
        match parse_geometry("  POINT(-172947.8 5985135.2) ")? {
            Geometry::Point(pt) => assert!((pt.x() + 172_947.8).abs() < 1e-6),
            other => panic!("Expected Point, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_wkt_multipolygon() -> Result<(), OnoMapError> {
        let wkt = "MULTIPOLYGON(((0 0,10 0,10 10,0 0)),((20 20,30 20,30 30,20 20)))";
        match parse_geometry(wkt)? {
            Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
            other => panic!("Expected MultiPolygon, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_garbage_and_empty() {
        assert!(parse_geometry("not a geometry").is_err());
        assert!(parse_geometry("   ").is_err());
    }
}
