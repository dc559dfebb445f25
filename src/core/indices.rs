//! Spectral index derivation.
//!
//! Indices are normalized differences of two reflectance bands, computed
//! by the imagery service at render time. This module fixes the band pair
//! per product and checks the selected scene actually carries those bands.

use crate::types::{DerivedProduct, GeoError, GeoResult, ProductKind, SceneReference};

/// Index products derived from every selected scene, in derivation order
pub const INDEX_PRODUCTS: [ProductKind; 3] = [
    ProductKind::Vegetation,
    ProductKind::Water,
    ProductKind::Burn,
];

/// Band pair `(a, b)` for the normalized difference `(a - b) / (a + b)`,
/// or `None` for products that are not indices
pub fn band_pair(kind: ProductKind) -> Option<(&'static str, &'static str)> {
    match kind {
        ProductKind::TrueColor => None,
        ProductKind::Vegetation => Some(("B8", "B4")), // NIR vs red
        ProductKind::Water => Some(("B3", "B8")),      // green vs NIR
        ProductKind::Burn => Some(("B8", "B12")),      // NIR vs SWIR
    }
}

/// Builds normalized-difference specifications for a selected scene
pub struct IndexEngine;

impl IndexEngine {
    /// Derive one index product, checking band availability first.
    pub fn derive(scene: &SceneReference, kind: ProductKind) -> GeoResult<DerivedProduct> {
        let (band_a, band_b) = band_pair(kind).ok_or_else(|| GeoError::IndexUnavailable {
            product: kind,
            reason: "not a normalized-difference product".to_string(),
        })?;

        for band in [band_a, band_b] {
            if !scene.has_band(band) {
                return Err(GeoError::IndexUnavailable {
                    product: kind,
                    reason: format!("scene {} is missing band {}", scene.id, band),
                });
            }
        }

        log::debug!(
            "Derived {} from bands ({}, {}) of {}",
            kind,
            band_a,
            band_b,
            scene.id
        );
        Ok(DerivedProduct {
            kind,
            scene_id: scene.id.clone(),
            band_a: band_a.to_string(),
            band_b: band_b.to_string(),
        })
    }

    /// Derive every index product. One unavailable index fails the set.
    pub fn derive_all(scene: &SceneReference) -> GeoResult<Vec<DerivedProduct>> {
        INDEX_PRODUCTS
            .iter()
            .map(|&kind| Self::derive(scene, kind))
            .collect()
    }
}
