//! Catalog wire models for the imagery service.
//!
//! Serde models for the STAC-flavored `POST /search` exchange: the query
//! body the selector sends and the feature collection the service returns.
//! Responses are decoded item by item so that one malformed or null entry
//! never discards the rest of the result set.

use crate::types::{BoundingBox, SceneReference, TimeWindow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Search request
// ---------------------------------------------------------------------------

/// Body for `POST /search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Property filters, e.g. `{"eo:cloud_cover": {"lt": 20.0}}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
}

impl CatalogQuery {
    /// Create empty query params.
    pub fn new() -> Self {
        Self {
            bbox: None,
            datetime: None,
            collections: None,
            limit: None,
            query: None,
        }
    }

    /// Set the bounding box `[west, south, east, north]`.
    pub fn bbox(mut self, bounds: &BoundingBox) -> Self {
        self.bbox = Some(bounds.to_wsen().to_vec());
        self
    }

    /// Set the acquisition window. The service treats the end date as
    /// exclusive, matching [`TimeWindow`] semantics.
    pub fn window(mut self, window: &TimeWindow) -> Self {
        self.datetime = Some(window.to_interval());
        self
    }

    /// Set collection filter.
    pub fn collections(mut self, cols: &[&str]) -> Self {
        self.collections = Some(cols.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Set maximum items per page.
    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    /// Keep only scenes with estimated cloud cover strictly below `pct`.
    pub fn max_cloud_cover(mut self, pct: f64) -> Self {
        self.query = Some(serde_json::json!({ "eo:cloud_cover": { "lt": pct } }));
        self
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A search response page (GeoJSON FeatureCollection).
///
/// Features stay as raw JSON until [`SceneCollection::scenes`] decodes them,
/// so a null or malformed entry is skipped instead of failing the page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneCollection {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub features: Vec<serde_json::Value>,

    #[serde(rename = "numberMatched", skip_serializing_if = "Option::is_none")]
    pub number_matched: Option<u64>,

    #[serde(rename = "numberReturned", skip_serializing_if = "Option::is_none")]
    pub number_returned: Option<u64>,
}

impl SceneCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Decode every usable feature into a [`SceneReference`].
    ///
    /// Entries that are null, fail to parse, or lack the fields selection
    /// depends on (id, acquisition date, cloud cover) are dropped with a
    /// warning.
    pub fn scenes(&self) -> Vec<SceneReference> {
        let mut out = Vec::with_capacity(self.features.len());
        for (idx, raw) in self.features.iter().enumerate() {
            let item: SceneItem = match serde_json::from_value(raw.clone()) {
                Ok(item) => item,
                Err(e) => {
                    log::warn!("Skipping unusable catalog entry {}: {}", idx, e);
                    continue;
                }
            };
            match item.to_reference() {
                Ok(scene) => out.push(scene),
                Err(reason) => {
                    log::warn!("Skipping catalog entry {}: {}", idx, reason);
                }
            }
        }
        out
    }
}

/// A single catalog scene (GeoJSON Feature).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneItem {
    /// Unique scene identifier.
    pub id: String,

    pub properties: SceneProperties,

    #[serde(default)]
    pub assets: HashMap<String, SceneAsset>,

    /// Bounding box `[west, south, east, north]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    /// Collection this scene belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl SceneItem {
    /// Band identifiers backed by a data asset, sorted for determinism.
    pub fn band_names(&self) -> Vec<String> {
        let mut bands: Vec<String> = self
            .assets
            .iter()
            .filter(|(_, a)| a.is_data())
            .map(|(k, _)| k.clone())
            .collect();
        bands.sort();
        bands
    }

    /// Validate the selection-critical fields and build a [`SceneReference`].
    pub fn to_reference(&self) -> Result<SceneReference, String> {
        if self.id.trim().is_empty() {
            return Err("empty scene id".to_string());
        }
        let datetime = self
            .properties
            .datetime
            .as_deref()
            .ok_or_else(|| format!("scene {} has no acquisition datetime", self.id))?;
        let acquired = parse_acquisition_date(datetime)
            .ok_or_else(|| format!("scene {} has unparseable datetime '{}'", self.id, datetime))?;
        let cloud_cover = self
            .properties
            .eo_cloud_cover
            .ok_or_else(|| format!("scene {} has no cloud cover estimate", self.id))?;

        Ok(SceneReference {
            id: self.id.clone(),
            acquired,
            cloud_cover,
            bands: self.band_names(),
        })
    }
}

/// Scene properties carried in the feature.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneProperties {
    /// ISO 8601 acquisition datetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    /// Cloud cover percentage (EO extension).
    #[serde(rename = "eo:cloud_cover", skip_serializing_if = "Option::is_none")]
    pub eo_cloud_cover: Option<f64>,

    /// Platform name (e.g., "sentinel-2a").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// All other properties we don't model explicitly.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A per-band asset reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneAsset {
    pub href: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Roles: `["data"]`, `["thumbnail"]`, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl SceneAsset {
    /// Whether the asset carries raster data. Assets without a roles field
    /// are assumed to be data.
    pub fn is_data(&self) -> bool {
        match &self.roles {
            Some(roles) => roles.iter().any(|r| r == "data"),
            None => true,
        }
    }
}

fn parse_acquisition_date(datetime: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(datetime) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(datetime, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
