//! Scene selection against the imagery catalog.

use crate::io::catalog::CatalogQuery;
use crate::io::session::ImageryBackend;
use crate::types::{AreaOfInterest, GeoError, GeoResult, SceneReference, TimeWindow};
use std::cmp::Ordering;

/// Scene selection parameters
#[derive(Debug, Clone)]
pub struct SelectorParams {
    /// Catalog collection to search
    pub collection: String,
    /// Reject scenes at or above this cloud cover percentage
    pub max_cloud_cover: f64,
    /// Page size requested from the catalog
    pub limit: u32,
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            collection: "sentinel-2-l2a".to_string(),
            max_cloud_cover: 20.0, // percent
            limit: 50,             // scenes per page
        }
    }
}

/// Picks the clearest scene for an area and acquisition window
pub struct SceneSelector<'a, B: ImageryBackend> {
    backend: &'a B,
    params: SelectorParams,
}

impl<'a, B: ImageryBackend> SceneSelector<'a, B> {
    /// Create a selector with default parameters
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            params: SelectorParams::default(),
        }
    }

    /// Create a selector with custom parameters
    pub fn with_params(backend: &'a B, params: SelectorParams) -> Self {
        Self { backend, params }
    }

    /// Query the catalog and pick the best scene.
    ///
    /// The clearest scene wins. Ties go to the most recent acquisition,
    /// then to the greatest id, so the choice is deterministic for any
    /// result set ordering.
    pub fn select(&self, aoi: &AreaOfInterest, window: &TimeWindow) -> GeoResult<SceneReference> {
        log::info!(
            "Searching {} for scenes from {} with cloud cover below {}%",
            self.params.collection,
            window,
            self.params.max_cloud_cover
        );

        let query = CatalogQuery::new()
            .bbox(&aoi.bounds())
            .window(window)
            .collections(&[self.params.collection.as_str()])
            .max_cloud_cover(self.params.max_cloud_cover)
            .limit(self.params.limit);

        let scenes = self.backend.search_scenes(&query)?;
        log::debug!("Catalog produced {} candidate scenes", scenes.len());

        let best = scenes
            .into_iter()
            // The service may ignore the query filter
            .filter(|scene| scene.cloud_cover < self.params.max_cloud_cover)
            .min_by(compare_scenes);

        match best {
            Some(scene) => {
                log::info!(
                    "Selected scene {} acquired {} with {:.2}% cloud cover",
                    scene.id,
                    scene.acquired,
                    scene.cloud_cover
                );
                Ok(scene)
            }
            None => {
                log::warn!("No scene matched the selection criteria");
                Err(GeoError::NoSceneFound)
            }
        }
    }
}

/// Total order: lowest cloud cover first, then most recent, then greatest id
fn compare_scenes(a: &SceneReference, b: &SceneReference) -> Ordering {
    a.cloud_cover
        .total_cmp(&b.cloud_cover)
        .then_with(|| b.acquired.cmp(&a.acquired))
        .then_with(|| b.id.cmp(&a.id))
}
