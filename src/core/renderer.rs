//! Map rendering through the imagery backend.
//!
//! Fixed visualization styles per product, turned into render requests and
//! persisted as per-run PNG artifacts. A failed render is reported to the
//! caller as a per-product error; deciding whether the run survives is the
//! orchestrator's job.

use crate::io::session::{ImageryBackend, RenderOperation, RenderRequest};
use crate::io::workspace::Workspace;
use crate::types::{
    AreaOfInterest, DerivedProduct, GeoError, GeoResult, ProductKind, RenderStyle,
    RenderedArtifact, RunId, SceneReference,
};
use std::fs;

/// Renderer parameters
#[derive(Debug, Clone)]
pub struct RendererParams {
    /// Output size in pixels, square
    pub dimensions: u32,
}

impl Default for RendererParams {
    fn default() -> Self {
        Self { dimensions: 512 }
    }
}

/// Fixed visualization style per product
pub fn style_for(kind: ProductKind) -> RenderStyle {
    match kind {
        ProductKind::TrueColor => RenderStyle::TrueColor {
            bands: ["B4".to_string(), "B3".to_string(), "B2".to_string()],
            min: 0.0,
            max: 3000.0, // typical reflectance stretch for Sentinel-2 L2A
        },
        ProductKind::Vegetation => RenderStyle::SingleBandRamp {
            min: -0.2,
            max: 0.9,
            // White/brown (bare) to deep green (dense vegetation)
            palette: palette(&[
                "FFFFFF", "CE7E45", "DF923D", "F1B555", "FCD163", "99B718", "74A901", "66A000",
                "529400", "3E8601", "207401", "056201", "004C00", "023B01", "012E01", "011D01",
                "011301",
            ]),
        },
        ProductKind::Water => RenderStyle::SingleBandRamp {
            min: -0.5,
            max: 0.5,
            // Red/orange (dry) to blue (wet)
            palette: palette(&[
                "#FF0000", "#FFA500", "#FFFF00", "#808080", "#00FFFF", "#0000FF",
            ]),
        },
        ProductKind::Burn => RenderStyle::SingleBandRamp {
            min: -0.5,
            max: 0.8,
            // Blue (low severity) to dark red (high severity)
            palette: palette(&[
                "#0000FF", "#00FFFF", "#FFFF00", "#FFA500", "#FF0000", "#8B0000",
            ]),
        },
    }
}

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

/// Fetches styled maps and stores them as per-run PNG artifacts
pub struct MapRenderer<'a, B: ImageryBackend> {
    backend: &'a B,
    workspace: &'a Workspace,
    params: RendererParams,
}

impl<'a, B: ImageryBackend> MapRenderer<'a, B> {
    /// Create a renderer with default parameters
    pub fn new(backend: &'a B, workspace: &'a Workspace) -> Self {
        Self {
            backend,
            workspace,
            params: RendererParams::default(),
        }
    }

    /// Create a renderer with custom parameters
    pub fn with_params(backend: &'a B, workspace: &'a Workspace, params: RendererParams) -> Self {
        Self {
            backend,
            workspace,
            params,
        }
    }

    /// Render the true-color reference image for a scene.
    pub fn render_true_color(
        &self,
        scene: &SceneReference,
        aoi: &AreaOfInterest,
        run_id: &RunId,
    ) -> GeoResult<RenderedArtifact> {
        let kind = ProductKind::TrueColor;
        let operation = match style_for(kind) {
            RenderStyle::TrueColor { bands, min, max } => {
                RenderOperation::Composite { bands, min, max }
            }
            RenderStyle::SingleBandRamp { .. } => {
                return Err(render_failed(kind, "true color product has a ramp style"))
            }
        };
        let request = RenderRequest {
            scene_id: scene.id.clone(),
            label: kind.key().to_string(),
            operation,
            region: aoi.geometry(),
            dimensions: self.params.dimensions,
        };
        self.fetch_and_store(kind, &request, run_id)
    }

    /// Render one derived index product.
    pub fn render_index(
        &self,
        product: &DerivedProduct,
        aoi: &AreaOfInterest,
        run_id: &RunId,
    ) -> GeoResult<RenderedArtifact> {
        let kind = product.kind;
        let operation = match style_for(kind) {
            RenderStyle::SingleBandRamp { min, max, palette } => {
                RenderOperation::NormalizedDifference {
                    band_a: product.band_a.clone(),
                    band_b: product.band_b.clone(),
                    min,
                    max,
                    palette,
                }
            }
            RenderStyle::TrueColor { .. } => {
                return Err(render_failed(kind, "index product has a composite style"))
            }
        };
        let request = RenderRequest {
            scene_id: product.scene_id.clone(),
            label: kind.key().to_string(),
            operation,
            region: aoi.geometry(),
            dimensions: self.params.dimensions,
        };
        self.fetch_and_store(kind, &request, run_id)
    }

    fn fetch_and_store(
        &self,
        kind: ProductKind,
        request: &RenderRequest,
        run_id: &RunId,
    ) -> GeoResult<RenderedArtifact> {
        log::info!("Rendering {} map for scene {}", kind, request.scene_id);

        let bytes = self
            .backend
            .fetch_map(request)
            .map_err(|e| render_failed(kind, &e.to_string()))?;
        if bytes.is_empty() {
            return Err(render_failed(kind, "service returned an empty image"));
        }

        let path = self.workspace.artifact_path(kind, run_id);
        fs::write(&path, &bytes)
            .map_err(|e| render_failed(kind, &format!("failed to write {}: {}", path.display(), e)))?;

        // Confirm the artifact really landed on disk
        let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            return Err(render_failed(kind, "artifact file is empty"));
        }

        log::info!("Stored {} ({} bytes)", path.display(), len);
        Ok(RenderedArtifact {
            product: kind,
            path,
            len,
        })
    }
}

fn render_failed(product: ProductKind, reason: &str) -> GeoError {
    GeoError::RenderFailed {
        product,
        reason: reason.to_string(),
    }
}
