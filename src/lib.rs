//! GeoInforme: A Fast Satellite Report Generator for Areas of Interest
//!
//! This library turns a point or uploaded polygon into a shareable report:
//! it selects the clearest recent Sentinel-2 scene from an imagery service,
//! derives vegetation, water and burn indices, renders styled maps and
//! assembles everything into a single document.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    AreaOfInterest, BoundingBox, DerivedProduct, GeoError, GeoResult, ProductKind,
    RenderStyle, RenderedArtifact, RunId, RunMetadata, RunOutput, SceneReference, TimeWindow,
};

pub use io::{
    BackendConfig, BackendSession, DocumentEngine, HtmlDocumentEngine, ImageryBackend, Workspace,
};

pub use core::{
    AoiInput, AoiResolver, IndexEngine, LookbackPeriod, MapRenderer, ReportAssembler,
    RunOrchestrator, RunRequest, RunState, SceneSelector,
};
