//! Area-of-interest resolution.
//!
//! Turns coordinate input or uploaded GeoJSON into the validated polygon
//! ring the rest of the pipeline works with. Point inputs become circular
//! buffers approximated with 64 segments; line-like inputs take their
//! bounding extent.

use crate::io::geojson::{self, VectorGeometry};
use crate::types::{AreaOfInterest, GeoError, GeoResult, LonLat};
use std::f64::consts::PI;

/// Buffer radius applied to point inputs without an explicit radius, in km
pub const DEFAULT_POINT_BUFFER_KM: f64 = 1.0;

/// Segments used to approximate circular buffers
const BUFFER_SEGMENTS: usize = 64;

/// Meters per degree of latitude (WGS-84 mean)
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Entry points that turn raw user input into an [`AreaOfInterest`]
pub struct AoiResolver;

impl AoiResolver {
    /// Resolve a point-plus-radius input.
    pub fn from_coordinates(lat: f64, lon: f64, radius_km: f64) -> GeoResult<AreaOfInterest> {
        validate_position(lon, lat)?;
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(GeoError::InvalidAoi(format!(
                "Buffer radius must be positive, got {}",
                radius_km
            )));
        }
        Ok(AreaOfInterest::from_closed_ring(buffer_ring(
            lon,
            lat,
            radius_km * 1000.0,
        )))
    }

    /// Resolve an uploaded vector file by name and content.
    pub fn from_upload(filename: &str, content: &str) -> GeoResult<AreaOfInterest> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".kml") || lower.ends_with(".kmz") {
            return Err(GeoError::InvalidAoi(
                "KML uploads are not supported yet, convert to GeoJSON".to_string(),
            ));
        }
        if !(lower.ends_with(".geojson") || lower.ends_with(".json")) {
            return Err(GeoError::InvalidAoi(format!(
                "Unsupported file type: {}",
                filename
            )));
        }
        Self::from_geojson(content)
    }

    /// Resolve GeoJSON text.
    pub fn from_geojson(text: &str) -> GeoResult<AreaOfInterest> {
        match geojson::parse_geometry(text)? {
            VectorGeometry::Polygon(ring) => close_and_validate(ring),
            VectorGeometry::Points(points) if points.len() == 1 => {
                let (lon, lat) = points[0];
                validate_position(lon, lat)?;
                Ok(AreaOfInterest::from_closed_ring(buffer_ring(
                    lon,
                    lat,
                    DEFAULT_POINT_BUFFER_KM * 1000.0,
                )))
            }
            VectorGeometry::Points(points) => ring_from_extent(&points),
            VectorGeometry::Lines(vertices) => ring_from_extent(&vertices),
        }
    }
}

/// Close the ring if the input left it open, then validate it.
fn close_and_validate(mut ring: Vec<LonLat>) -> GeoResult<AreaOfInterest> {
    for &(lon, lat) in &ring {
        validate_position(lon, lat)?;
    }
    if ring.first() != ring.last() {
        let first = ring[0];
        ring.push(first);
    }
    // Closed ring: n distinct vertices plus the repeated first one
    if ring.len() < 4 {
        return Err(GeoError::InvalidAoi(
            "Polygon ring needs at least three distinct vertices".to_string(),
        ));
    }
    Ok(AreaOfInterest::from_closed_ring(ring))
}

/// Bounding-box ring around multi-point or line vertices. Axes with no
/// extent are padded so the area never collapses to a line.
fn ring_from_extent(points: &[LonLat]) -> GeoResult<AreaOfInterest> {
    if points.is_empty() {
        return Err(GeoError::InvalidAoi("Geometry has no vertices".to_string()));
    }
    for &(lon, lat) in points {
        validate_position(lon, lat)?;
    }

    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    for &(lon, lat) in points {
        min_lon = min_lon.min(lon);
        max_lon = max_lon.max(lon);
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
    }

    let mid_lat = (min_lat + max_lat) / 2.0;
    let pad_m = DEFAULT_POINT_BUFFER_KM * 1000.0;
    if max_lat - min_lat < f64::EPSILON {
        let dlat = pad_m / METERS_PER_DEGREE;
        min_lat = clamp_lat(min_lat - dlat);
        max_lat = clamp_lat(max_lat + dlat);
    }
    if max_lon - min_lon < f64::EPSILON {
        let dlon = pad_m / (METERS_PER_DEGREE * mid_lat.to_radians().cos().max(1e-6));
        min_lon = clamp_lon(min_lon - dlon);
        max_lon = clamp_lon(max_lon + dlon);
    }

    Ok(AreaOfInterest::from_closed_ring(vec![
        (min_lon, min_lat),
        (max_lon, min_lat),
        (max_lon, max_lat),
        (min_lon, max_lat),
        (min_lon, min_lat),
    ]))
}

fn buffer_ring(lon: f64, lat: f64, radius_m: f64) -> Vec<LonLat> {
    let dlat = radius_m / METERS_PER_DEGREE;
    // cos(lat) collapses at the poles
    let cos_lat = lat.to_radians().cos().max(1e-6);
    let dlon = radius_m / (METERS_PER_DEGREE * cos_lat);

    let mut ring = Vec::with_capacity(BUFFER_SEGMENTS + 1);
    for i in 0..BUFFER_SEGMENTS {
        let angle = 2.0 * PI * i as f64 / BUFFER_SEGMENTS as f64;
        ring.push((
            clamp_lon(lon + dlon * angle.cos()),
            clamp_lat(lat + dlat * angle.sin()),
        ));
    }
    // Close the ring
    ring.push(ring[0]);
    ring
}

fn validate_position(lon: f64, lat: f64) -> GeoResult<()> {
    let valid = lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat);
    if !valid {
        return Err(GeoError::InvalidAoi(format!(
            "Coordinates (lat {}, lon {}) out of range",
            lat, lon
        )));
    }
    Ok(())
}

fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

fn clamp_lon(lon: f64) -> f64 {
    lon.clamp(-180.0, 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_buffered_point_centers_on_input() {
        let aoi = AoiResolver::from_coordinates(-36.82, -73.05, 5.0).unwrap();

        let (lon, lat) = aoi.centroid();
        assert_abs_diff_eq!(lon, -73.05, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, -36.82, epsilon = 1e-9);

        let bounds = aoi.bounds();
        let (center_lon, center_lat) = bounds.center();
        assert_abs_diff_eq!(center_lon, -73.05, epsilon = 1e-6);
        assert_abs_diff_eq!(center_lat, -36.82, epsilon = 1e-6);

        // 5 km radius spans about 0.09 degrees of latitude
        assert_abs_diff_eq!(bounds.max_lat - bounds.min_lat, 0.0898, epsilon = 1e-3);
    }

    #[test]
    fn test_buffer_ring_is_closed_with_64_segments() {
        let aoi = AoiResolver::from_coordinates(0.0, 0.0, 1.0).unwrap();
        let ring = aoi.ring();
        assert_eq!(ring.len(), 65);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        assert!(AoiResolver::from_coordinates(95.0, 0.0, 1.0).is_err());
        assert!(AoiResolver::from_coordinates(0.0, 181.0, 1.0).is_err());
        assert!(AoiResolver::from_coordinates(f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        assert!(AoiResolver::from_coordinates(0.0, 0.0, 0.0).is_err());
        assert!(AoiResolver::from_coordinates(0.0, 0.0, -2.0).is_err());
        assert!(AoiResolver::from_coordinates(0.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_unclosed_polygon_ring_gets_closed() {
        let text = r#"{"type": "Polygon", "coordinates": [[[-73.1, -36.9], [-73.0, -36.9], [-73.0, -36.8], [-73.1, -36.8]]]}"#;
        let aoi = AoiResolver::from_geojson(text).unwrap();
        let ring = aoi.ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_degenerate_ring_rejected() {
        let text = r#"{"type": "Polygon", "coordinates": [[[-73.1, -36.9], [-73.0, -36.9]]]}"#;
        assert!(AoiResolver::from_geojson(text).is_err());
    }

    #[test]
    fn test_single_point_gets_default_buffer() {
        let text = r#"{"type": "Point", "coordinates": [-73.05, -36.82]}"#;
        let aoi = AoiResolver::from_geojson(text).unwrap();

        let (lon, lat) = aoi.centroid();
        assert_abs_diff_eq!(lon, -73.05, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, -36.82, epsilon = 1e-9);

        // Default 1 km radius spans about 0.018 degrees of latitude
        let bounds = aoi.bounds();
        assert_abs_diff_eq!(bounds.max_lat - bounds.min_lat, 0.018, epsilon = 1e-3);
    }

    #[test]
    fn test_line_takes_padded_extent() {
        // Vertical line: zero longitude extent must get padded
        let text = r#"{"type": "LineString", "coordinates": [[-73.05, -36.9], [-73.05, -36.8]]}"#;
        let aoi = AoiResolver::from_geojson(text).unwrap();

        let bounds = aoi.bounds();
        assert!(bounds.max_lon > bounds.min_lon);
        assert_abs_diff_eq!(bounds.min_lat, -36.9, epsilon = 1e-9);
        assert_abs_diff_eq!(bounds.max_lat, -36.8, epsilon = 1e-9);
    }

    #[test]
    fn test_kml_upload_rejected() {
        let err = AoiResolver::from_upload("area.kml", "<kml/>").unwrap_err();
        assert!(err.to_string().contains("KML"));
    }

    #[test]
    fn test_geojson_upload_accepted() {
        let text = r#"{"type": "Point", "coordinates": [-73.05, -36.82]}"#;
        assert!(AoiResolver::from_upload("area.geojson", text).is_ok());
        assert!(AoiResolver::from_upload("area.json", text).is_ok());
        assert!(AoiResolver::from_upload("area.shp", text).is_err());
    }

    #[test]
    fn test_geometry_json_shape() {
        let aoi = AoiResolver::from_coordinates(10.0, 20.0, 1.0).unwrap();
        let geometry = aoi.geometry();
        assert_eq!(geometry["type"], "Polygon");
        let ring = geometry["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 65);
    }
}
