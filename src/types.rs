use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Longitude/latitude pair in WGS-84 decimal degrees
pub type LonLat = (f64, f64);

/// Geospatial bounding box in WGS-84 decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Bounds in `[west, south, east, north]` order as catalog queries expect
    pub fn to_wsen(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    pub fn center(&self) -> LonLat {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// A resolved area of interest: a closed polygon ring in lon/lat degrees.
///
/// Construction goes through the resolver, which guarantees the ring is
/// closed, non-empty and within valid coordinate ranges. The geometry is
/// never mutated after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    ring: Vec<LonLat>,
}

impl AreaOfInterest {
    /// Builds an AOI from a pre-validated closed ring.
    ///
    /// Callers outside the resolver should prefer the resolver entry points.
    pub(crate) fn from_closed_ring(ring: Vec<LonLat>) -> Self {
        debug_assert!(ring.len() >= 4);
        debug_assert_eq!(ring.first(), ring.last());
        AreaOfInterest { ring }
    }

    /// Exterior ring vertices, first vertex repeated at the end
    pub fn ring(&self) -> &[LonLat] {
        &self.ring
    }

    pub fn bounds(&self) -> BoundingBox {
        let mut bbox = BoundingBox {
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
        };
        for &(lon, lat) in &self.ring {
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        bbox
    }

    /// Mean of the ring vertices (closing vertex excluded), as (lon, lat)
    pub fn centroid(&self) -> LonLat {
        let open = &self.ring[..self.ring.len() - 1];
        let n = open.len() as f64;
        let (sum_lon, sum_lat) = open
            .iter()
            .fold((0.0, 0.0), |(slon, slat), &(lon, lat)| (slon + lon, slat + lat));
        (sum_lon / n, sum_lat / n)
    }

    /// GeoJSON Polygon geometry for region clipping in render requests
    pub fn geometry(&self) -> serde_json::Value {
        let coords: Vec<[f64; 2]> = self.ring.iter().map(|&(lon, lat)| [lon, lat]).collect();
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [coords],
        })
    }
}

/// Half-open date interval `[start, end)` used for catalog queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Interval encoded as `start/end` for the catalog datetime parameter
    pub fn to_interval(&self) -> String {
        format!("{}/{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// One catalog scene with the fields the pipeline selects on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneReference {
    pub id: String,
    pub acquired: NaiveDate,
    /// Estimated cloud cover percentage, 0-100
    pub cloud_cover: f64,
    pub bands: Vec<String>,
}

impl SceneReference {
    pub fn has_band(&self, name: &str) -> bool {
        self.bands.iter().any(|b| b == name)
    }
}

/// The four report products, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductKind {
    TrueColor,
    Vegetation,
    Water,
    Burn,
}

impl ProductKind {
    pub const ALL: [ProductKind; 4] = [
        ProductKind::TrueColor,
        ProductKind::Vegetation,
        ProductKind::Water,
        ProductKind::Burn,
    ];

    /// Short key used in artifact filenames and render labels
    pub fn key(&self) -> &'static str {
        match self {
            ProductKind::TrueColor => "rgb",
            ProductKind::Vegetation => "ndvi",
            ProductKind::Water => "ndwi",
            ProductKind::Burn => "nbr",
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A normalized-difference raster specification `(a - b) / (a + b)`
/// derived from a selected scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedProduct {
    pub kind: ProductKind,
    pub scene_id: String,
    pub band_a: String,
    pub band_b: String,
}

/// Visualization style attached to a render request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderStyle {
    /// Direct composite of three reflectance bands
    TrueColor {
        bands: [String; 3],
        min: f64,
        max: f64,
    },
    /// Single-band color ramp for normalized-difference rasters
    SingleBandRamp {
        min: f64,
        max: f64,
        palette: Vec<String>,
    },
}

/// A map image written to the working directory
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub product: ProductKind,
    pub path: PathBuf,
    /// Size on disk in bytes, always > 0
    pub len: u64,
}

static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Per-run identifier: UTC second timestamp plus a process-wide sequence
/// number, so runs started within the same second stay distinct
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    pub fn next() -> Self {
        let seq = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        RunId(format!("{}-{:03}", Utc::now().format("%Y%m%d-%H%M%S"), seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of a completed run, echoed into the report header
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub run_id: RunId,
    pub aoi_bounds: BoundingBox,
    pub window: TimeWindow,
    pub scene_id: String,
    pub scene_date: NaiveDate,
    pub cloud_cover: f64,
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub metadata: RunMetadata,
    pub artifacts: std::collections::BTreeMap<ProductKind, RenderedArtifact>,
    pub report_path: PathBuf,
}

/// Error types for the report pipeline
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid area of interest: {0}")]
    InvalidAoi(String),

    #[error("No scene matched the area, period and cloud ceiling")]
    NoSceneFound,

    #[error("Index {product} unavailable: {reason}")]
    IndexUnavailable { product: ProductKind, reason: String },

    #[error("Index calculation failed: {0}")]
    IndexCalculationFailed(String),

    #[error("Rendering {product} failed: {reason}")]
    RenderFailed { product: ProductKind, reason: String },

    #[error("No artifacts generated: every map render failed")]
    NoArtifactsGenerated,

    #[error("Report assembly failed: {0}")]
    ReportAssemblyFailed(String),

    #[error("Imagery backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Result type for pipeline operations
pub type GeoResult<T> = Result<T, GeoError>;
