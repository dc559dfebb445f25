//! Run orchestration.
//!
//! One entry point drives a full run through resolution, selection, index
//! derivation, rendering and report assembly. Stage order is fixed. A
//! missing scene or index aborts the run; an individual map failure only
//! drops that product, and the run dies only when every map failed.

use crate::core::aoi::AoiResolver;
use crate::core::indices::IndexEngine;
use crate::core::renderer::{MapRenderer, RendererParams};
use crate::core::report::ReportAssembler;
use crate::core::selector::{SceneSelector, SelectorParams};
use crate::core::time_window::{self, LookbackPeriod};
use crate::io::document::DocumentEngine;
use crate::io::session::ImageryBackend;
use crate::io::workspace::Workspace;
use crate::types::{
    AreaOfInterest, GeoError, GeoResult, ProductKind, RenderedArtifact, RunId, RunMetadata,
    RunOutput,
};
use std::collections::BTreeMap;
use std::time::Instant;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ResolvingAoi,
    SelectingScene,
    ComputingIndices,
    Rendering,
    AssemblingReport,
    Done,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::ResolvingAoi => "resolving-aoi",
            RunState::SelectingScene => "selecting-scene",
            RunState::ComputingIndices => "computing-indices",
            RunState::Rendering => "rendering",
            RunState::AssemblingReport => "assembling-report",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// How the caller describes the area to analyze
#[derive(Debug, Clone)]
pub enum AoiInput {
    /// Point plus buffer radius in kilometers
    Coordinates { lat: f64, lon: f64, radius_km: f64 },
    /// Uploaded vector file, by name and text content
    Upload { filename: String, content: String },
}

/// One report request
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub aoi: AoiInput,
    pub lookback: LookbackPeriod,
}

/// Drives full report runs against one backend and one layout engine
pub struct RunOrchestrator<'a, B: ImageryBackend, D: DocumentEngine> {
    backend: &'a B,
    engine: &'a D,
    workspace: Workspace,
    pub selector_params: SelectorParams,
    pub renderer_params: RendererParams,
    state: RunState,
}

impl<'a, B: ImageryBackend, D: DocumentEngine> RunOrchestrator<'a, B, D> {
    pub fn new(backend: &'a B, engine: &'a D, workspace: Workspace) -> Self {
        Self {
            backend,
            engine,
            workspace,
            selector_params: SelectorParams::default(),
            renderer_params: RendererParams::default(),
            state: RunState::Idle,
        }
    }

    /// Stage the orchestrator is currently in
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Execute one full run.
    pub fn run(&mut self, request: &RunRequest) -> GeoResult<RunOutput> {
        let outcome = self.execute(request);
        self.state = match &outcome {
            Ok(_) => RunState::Done,
            Err(e) => {
                log::error!("Run failed while {}: {}", self.state, e);
                RunState::Failed
            }
        };
        outcome
    }

    fn execute(&mut self, request: &RunRequest) -> GeoResult<RunOutput> {
        let started = Instant::now();
        let run_id = RunId::next();
        log::info!("Starting run {}", run_id);

        // Previous artifacts are wiped before any stage runs
        self.workspace.ensure()?;
        let removed = self.workspace.clean()?;
        if removed > 0 {
            log::info!("Cleared {} artifacts from previous runs", removed);
        }

        self.transition(RunState::ResolvingAoi);
        let aoi = resolve_aoi(&request.aoi)?;

        let window = time_window::resolve_today(request.lookback);
        log::info!("Acquisition window {} ({})", window, request.lookback);

        self.transition(RunState::SelectingScene);
        let selector = SceneSelector::with_params(self.backend, self.selector_params.clone());
        let scene = selector.select(&aoi, &window)?;

        self.transition(RunState::ComputingIndices);
        let products = IndexEngine::derive_all(&scene)
            .map_err(|e| GeoError::IndexCalculationFailed(e.to_string()))?;

        self.transition(RunState::Rendering);
        let renderer =
            MapRenderer::with_params(self.backend, &self.workspace, self.renderer_params.clone());
        let mut artifacts: BTreeMap<ProductKind, RenderedArtifact> = BTreeMap::new();

        match renderer.render_true_color(&scene, &aoi, &run_id) {
            Ok(artifact) => {
                artifacts.insert(artifact.product, artifact);
            }
            Err(e) => log::warn!("{}", e),
        }
        for product in &products {
            match renderer.render_index(product, &aoi, &run_id) {
                Ok(artifact) => {
                    artifacts.insert(artifact.product, artifact);
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        if artifacts.is_empty() {
            return Err(GeoError::NoArtifactsGenerated);
        }
        log::info!(
            "Rendered {} of {} products",
            artifacts.len(),
            1 + products.len()
        );

        self.transition(RunState::AssemblingReport);
        let metadata = RunMetadata {
            run_id: run_id.clone(),
            aoi_bounds: aoi.bounds(),
            window,
            scene_id: scene.id.clone(),
            scene_date: scene.acquired,
            cloud_cover: scene.cloud_cover,
        };
        let assembler = ReportAssembler::new(self.engine);
        let report_path = assembler.assemble(&metadata, &artifacts, &self.workspace)?;

        log::info!(
            "Run {} finished in {:.2}s",
            run_id,
            started.elapsed().as_secs_f64()
        );
        Ok(RunOutput {
            metadata,
            artifacts,
            report_path,
        })
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("State {} -> {}", self.state, next);
        self.state = next;
    }
}

fn resolve_aoi(input: &AoiInput) -> GeoResult<AreaOfInterest> {
    match input {
        AoiInput::Coordinates {
            lat,
            lon,
            radius_km,
        } => {
            log::info!(
                "Resolving AOI from point ({}, {}) with {} km buffer",
                lat,
                lon,
                radius_km
            );
            AoiResolver::from_coordinates(*lat, *lon, *radius_km)
        }
        AoiInput::Upload { filename, content } => {
            log::info!("Resolving AOI from uploaded file {}", filename);
            AoiResolver::from_upload(filename, content)
        }
    }
}
