//! GeoJSON input handling for uploaded areas of interest.
//!
//! Accepts a FeatureCollection (first feature wins), a single Feature, or
//! a bare geometry, and extracts the vertex lists the resolver turns into
//! an [`crate::types::AreaOfInterest`]. Validation of coordinate ranges
//! and ring closure happens in the resolver, not here.

use crate::types::{GeoError, GeoResult, LonLat};
use serde_json::Value;

/// Geometry classes accepted from uploads
#[derive(Debug, Clone, PartialEq)]
pub enum VectorGeometry {
    /// Exterior ring of the first polygon
    Polygon(Vec<LonLat>),
    /// Point or MultiPoint vertices
    Points(Vec<LonLat>),
    /// LineString or MultiLineString vertices
    Lines(Vec<LonLat>),
}

/// Parse GeoJSON text and extract the working geometry.
pub fn parse_geometry(text: &str) -> GeoResult<VectorGeometry> {
    let data: Value = serde_json::from_str(text)
        .map_err(|e| GeoError::InvalidAoi(format!("Invalid GeoJSON: {}", e)))?;
    let geometry = unwrap_geometry(&data)?;
    decode_geometry(geometry)
}

fn unwrap_geometry(data: &Value) -> GeoResult<&Value> {
    match type_of(data)? {
        "FeatureCollection" => {
            let features = data
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    GeoError::InvalidAoi("FeatureCollection has no features array".to_string())
                })?;
            let first = features.first().ok_or_else(|| {
                GeoError::InvalidAoi("FeatureCollection contains no features".to_string())
            })?;
            feature_geometry(first)
        }
        "Feature" => feature_geometry(data),
        _ => Ok(data),
    }
}

fn feature_geometry(feature: &Value) -> GeoResult<&Value> {
    feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or_else(|| GeoError::InvalidAoi("Feature has no geometry".to_string()))
}

fn decode_geometry(geometry: &Value) -> GeoResult<VectorGeometry> {
    match type_of(geometry)? {
        "Polygon" => Ok(VectorGeometry::Polygon(exterior_ring(coordinates(
            geometry, "Polygon",
        )?)?)),
        "MultiPolygon" => {
            let polygons = coordinates(geometry, "MultiPolygon")?
                .as_array()
                .filter(|a| !a.is_empty())
                .ok_or_else(|| GeoError::InvalidAoi("MultiPolygon is empty".to_string()))?;
            Ok(VectorGeometry::Polygon(exterior_ring(&polygons[0])?))
        }
        "Point" => Ok(VectorGeometry::Points(vec![position(coordinates(
            geometry, "Point",
        )?)?])),
        "MultiPoint" => Ok(VectorGeometry::Points(positions(coordinates(
            geometry,
            "MultiPoint",
        )?)?)),
        "LineString" => Ok(VectorGeometry::Lines(positions(coordinates(
            geometry,
            "LineString",
        )?)?)),
        "MultiLineString" => {
            let lines = coordinates(geometry, "MultiLineString")?
                .as_array()
                .ok_or_else(|| GeoError::InvalidAoi("Malformed MultiLineString".to_string()))?;
            let mut vertices = Vec::new();
            for line in lines {
                vertices.extend(positions(line)?);
            }
            Ok(VectorGeometry::Lines(vertices))
        }
        other => Err(GeoError::InvalidAoi(format!(
            "Unsupported GeoJSON type: {}",
            other
        ))),
    }
}

fn coordinates<'a>(geometry: &'a Value, gtype: &str) -> GeoResult<&'a Value> {
    geometry.get("coordinates").ok_or_else(|| {
        GeoError::InvalidAoi(format!("{} geometry has no coordinates", gtype))
    })
}

fn type_of(value: &Value) -> GeoResult<&str> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeoError::InvalidAoi("GeoJSON value has no type field".to_string()))
}

fn position(value: &Value) -> GeoResult<LonLat> {
    let arr = value
        .as_array()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| GeoError::InvalidAoi("Malformed coordinate position".to_string()))?;
    let lon = arr[0]
        .as_f64()
        .ok_or_else(|| GeoError::InvalidAoi("Non-numeric longitude".to_string()))?;
    let lat = arr[1]
        .as_f64()
        .ok_or_else(|| GeoError::InvalidAoi("Non-numeric latitude".to_string()))?;
    Ok((lon, lat))
}

fn positions(value: &Value) -> GeoResult<Vec<LonLat>> {
    let arr = value
        .as_array()
        .ok_or_else(|| GeoError::InvalidAoi("Malformed coordinate list".to_string()))?;
    arr.iter().map(position).collect()
}

fn exterior_ring(coords: &Value) -> GeoResult<Vec<LonLat>> {
    let rings = coords
        .as_array()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| GeoError::InvalidAoi("Polygon has no rings".to_string()))?;
    let ring = positions(&rings[0])?;
    if ring.is_empty() {
        return Err(GeoError::InvalidAoi("Polygon ring is empty".to_string()));
    }
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection_uses_first_feature() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[-73.1, -36.9], [-73.0, -36.9], [-73.0, -36.8], [-73.1, -36.8], [-73.1, -36.9]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}
            ]
        }"#;
        match parse_geometry(text).unwrap() {
            VectorGeometry::Polygon(ring) => {
                assert_eq!(ring.len(), 5);
                assert_eq!(ring[0], (-73.1, -36.9));
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_geometries() {
        let point = r#"{"type": "Point", "coordinates": [-73.05, -36.82]}"#;
        assert_eq!(
            parse_geometry(point).unwrap(),
            VectorGeometry::Points(vec![(-73.05, -36.82)])
        );

        let line = r#"{"type": "LineString", "coordinates": [[-73.1, -36.9], [-73.0, -36.8]]}"#;
        assert_eq!(
            parse_geometry(line).unwrap(),
            VectorGeometry::Lines(vec![(-73.1, -36.9), (-73.0, -36.8)])
        );

        let multi = r#"{"type": "MultiPoint", "coordinates": [[-73.1, -36.9], [-73.0, -36.8]]}"#;
        assert_eq!(
            parse_geometry(multi).unwrap(),
            VectorGeometry::Points(vec![(-73.1, -36.9), (-73.0, -36.8)])
        );
    }

    #[test]
    fn test_multipolygon_takes_first_exterior_ring() {
        let text = r#"{"type": "MultiPolygon", "coordinates": [
            [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]], [[0.2, 0.2], [0.4, 0.2], [0.4, 0.4], [0.2, 0.2]]],
            [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
        ]}"#;
        match parse_geometry(text).unwrap() {
            VectorGeometry::Polygon(ring) => {
                assert_eq!(ring.len(), 4);
                assert_eq!(ring[0], (0.0, 0.0));
                assert_eq!(ring[2], (1.0, 1.0));
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_feature_collection_rejected() {
        let text = r#"{"type": "FeatureCollection", "features": []}"#;
        let err = parse_geometry(text).unwrap_err();
        assert!(matches!(err, GeoError::InvalidAoi(_)));
        assert!(err.to_string().contains("no features"));
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let text = r#"{"type": "GeometryCollection", "geometries": []}"#;
        let err = parse_geometry(text).unwrap_err();
        assert!(err.to_string().contains("Unsupported GeoJSON type"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = parse_geometry("{not json").unwrap_err();
        assert!(matches!(err, GeoError::InvalidAoi(_)));
    }

    #[test]
    fn test_feature_without_geometry_rejected() {
        let text = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        let err = parse_geometry(text).unwrap_err();
        assert!(err.to_string().contains("no geometry"));
    }
}
