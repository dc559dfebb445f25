//! Report assembly.
//!
//! Collects whatever artifacts a run produced into one document and hands
//! it to the layout engine. All reader-facing text is Spanish, matching
//! the product UI.

use crate::io::document::{Document, DocumentEngine, ImageBlock, Section};
use crate::io::workspace::Workspace;
use crate::types::{GeoError, GeoResult, ProductKind, RenderedArtifact, RunMetadata};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Report title
pub const REPORT_TITLE: &str = "GeoInforme Express - Reporte Satelital";

/// Embedded image display width in pixels
const IMAGE_WIDTH_PX: u32 = 576;

const DISCLAIMER: [&str; 2] = [
    "Este es un informe generado automáticamente por GeoInforme Express.",
    "Los resultados son preliminares y dependen de la calidad y disponibilidad de las imágenes satelitales.",
];

fn section_heading(kind: ProductKind) -> &'static str {
    match kind {
        ProductKind::TrueColor => "Imagen Color Verdadero (RGB)",
        ProductKind::Vegetation => "Índice de Vegetación (NDVI)",
        ProductKind::Water => "Índice de Agua (NDWI)",
        ProductKind::Burn => "Ratio de Quemado Normalizado (NBR)",
    }
}

fn section_caption(kind: ProductKind) -> &'static str {
    match kind {
        ProductKind::TrueColor => "Referencia visual del área.",
        ProductKind::Vegetation => {
            "Valores altos (verde) indican vegetación vigorosa. Valores bajos (marrón/blanco) \
             indican suelo desnudo, agua o vegetación estresada."
        }
        ProductKind::Water => {
            "Valores altos (azul) indican presencia de agua o alta humedad. Valores bajos \
             (rojo/amarillo) indican áreas secas."
        }
        ProductKind::Burn => {
            "Valores bajos indican áreas quemadas recientemente (pre-incendio vs post-incendio \
             para dNBR). Este NBR simple puede correlacionarse con estrés hídrico o áreas quemadas."
        }
    }
}

/// Binds run results into a document and hands it to the layout engine
pub struct ReportAssembler<'a, D: DocumentEngine> {
    engine: &'a D,
}

impl<'a, D: DocumentEngine> ReportAssembler<'a, D> {
    pub fn new(engine: &'a D) -> Self {
        Self { engine }
    }

    /// Assemble the report from whatever artifacts the run produced.
    ///
    /// Sections follow the fixed product order. A product without a
    /// readable artifact is omitted entirely, no placeholder.
    pub fn assemble(
        &self,
        metadata: &RunMetadata,
        artifacts: &BTreeMap<ProductKind, RenderedArtifact>,
        workspace: &Workspace,
    ) -> GeoResult<PathBuf> {
        let mut sections = Vec::new();
        for kind in ProductKind::ALL {
            let artifact = match artifacts.get(&kind) {
                Some(artifact) => artifact,
                None => {
                    log::debug!("No {} artifact, skipping section", kind);
                    continue;
                }
            };
            let png = match fs::read(&artifact.path) {
                Ok(bytes) if !bytes.is_empty() => bytes,
                Ok(_) => {
                    log::warn!(
                        "Artifact {} is empty, skipping section",
                        artifact.path.display()
                    );
                    continue;
                }
                Err(e) => {
                    log::warn!("Cannot read artifact {}: {}", artifact.path.display(), e);
                    continue;
                }
            };
            sections.push(Section {
                heading: section_heading(kind).to_string(),
                body: section_caption(kind).to_string(),
                image: Some(ImageBlock {
                    png,
                    width_px: IMAGE_WIDTH_PX,
                }),
            });
        }

        let document = Document {
            title: REPORT_TITLE.to_string(),
            meta: vec![
                (
                    "Fecha de Procesamiento".to_string(),
                    metadata.run_id.to_string(),
                ),
                ("Imagen Base".to_string(), metadata.scene_id.clone()),
                (
                    "Fecha Imagen".to_string(),
                    metadata.scene_date.format("%Y-%m-%d").to_string(),
                ),
                (
                    "Cobertura Nubosa Estimada".to_string(),
                    format!("{:.2}%", metadata.cloud_cover),
                ),
            ],
            sections,
            footer: DISCLAIMER.iter().map(|s| s.to_string()).collect(),
        };

        let path = workspace.report_path(&metadata.run_id, self.engine.extension());
        log::info!(
            "Assembling report {} with {} map sections",
            path.display(),
            document.sections.len()
        );
        self.engine
            .render(&document, &path)
            .map_err(|e| GeoError::ReportAssemblyFailed(e.to_string()))?;
        Ok(path)
    }
}
